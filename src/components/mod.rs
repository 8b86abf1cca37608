// ABOUTME: UI components for the TUI interface: login, assessment wizard, results and layout

pub mod assessment;
pub mod layout;
pub mod login;
pub mod results;

pub use assessment::AssessmentComponent;
pub use layout::LayoutComponent;
pub use login::LoginComponent;
pub use results::ResultsComponent;
