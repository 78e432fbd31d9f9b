use dioxus::prelude::*;

use crate::pages::{
    DashboardPage, EditProjectPage, NewProjectPage, NotFoundPage, ProfilePage, ProjectDetailPage, ProjectsPage, ReportsPage, SignInPage, SignUpPage
};

#[component]
pub fn AppRouter() -> Element {
    rsx! {
        Router::<Routes> {}
    }
}

#[derive(Clone, Routable, PartialEq, Debug)]
pub enum Routes {
    #[route("/")]
    DashboardPage {},
    #[route("/projects")]
    ProjectsPage {},
    #[route("/projects/new")]
    NewProjectPage {},
    #[route("/projects/:id")]
    ProjectDetailPage { id: String },
    #[route("/projects/:id/edit")]
    EditProjectPage { id: String },
    #[route("/reports")]
    ReportsPage {},
    #[route("/profile")]
    ProfilePage {},
    #[route("/signin?:from")]
    SignInPage { from: String },
    #[route("/signup")]
    SignUpPage {},
    #[route("/:..route")]
    NotFoundPage { route: Vec<String> },
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pp_types::{SIGN_IN_PATH, SIGN_UP_PATH};

    use super::*;

    #[test]
    fn test_paths_match_session_paths() {
        assert_eq!(Routes::SignUpPage {}.to_string(), SIGN_UP_PATH);
        assert!(Routes::SignInPage { from: String::new() }.to_string().starts_with(SIGN_IN_PATH));
    }

    #[test]
    fn test_project_routes_parse() {
        assert_eq!(Routes::from_str("/projects/new").unwrap(), Routes::NewProjectPage {});
        assert_eq!(
            Routes::from_str("/projects/7/edit").unwrap(),
            Routes::EditProjectPage { id: "7".to_string() }
        );
    }
}
