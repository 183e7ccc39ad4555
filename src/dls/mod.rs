//! Resource accounting and target calculation for interrupted limited-overs matches.

pub mod accountant;
pub mod assessment;
pub mod context;
pub mod innings;
pub mod par_sheet;
pub mod target;

pub use accountant::{
    innings_total_resources, interruption_losses, team1_total_resources, team2_resources,
    team2_resources_used, team2_total_resources, InterruptionLoss,
};
pub use assessment::{assess, DlsAssessment, InningsInput};
pub use context::MatchResourceContext;
pub use innings::{
    current_overs_limit, Delivery, DeliveryRecord, ExtraType, InningsState, InterruptionEvent,
};
pub use par_sheet::{par_sheet, ParSheetRow};
pub use target::{par_score_now, ratio_only_target, revised_target, TargetFormula};
