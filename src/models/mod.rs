// Model exports
pub mod dates;
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Applicant, ApplicantProfile, ApplicantProgress, CallStatus, Employee, EmployeeDetails,
    FunnelStage, Interview, InterviewDetails, InterviewResult, InterviewStatus, Job, JobDetails,
    LocationMatch, MatchDetail, MatchEvaluation, MatchLevel, PhoneCall, PhoneCallDetails,
    ScoringWeights, TravelEstimate, TravelMode,
};
pub use requests::{
    ApplicantMatchQuery, AssignEmployeeRequest, DistanceRequest, JobMatchQuery, LoginRequest,
    NewApplicant, PageQuery, ReferralFeeRequest, SpreadsheetTestRequest, TimeframeQuery, UploadQuery,
};
pub use responses::{
    ApplicantMatch, ApplicantView, DistanceResponse, ErrorResponse, HealthResponse,
    ImportResponse, JobMatch, LoginResponse, Paginated,
};
