pub mod dashboard;
pub mod not_found;
pub mod profile;
pub mod project_detail;
pub mod project_form;
pub mod projects;
pub mod reports;
pub mod signin;
pub mod signup;

pub use dashboard::DashboardPage;
pub use not_found::NotFoundPage;
pub use profile::ProfilePage;
pub use project_detail::ProjectDetailPage;
pub use project_form::{EditProjectPage, NewProjectPage};
pub use projects::ProjectsPage;
pub use reports::ReportsPage;
pub use signin::SignInPage;
pub use signup::SignUpPage;
