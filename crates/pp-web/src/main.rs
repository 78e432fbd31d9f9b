use pp_web::app_root::app_root;

fn main() {
    pp_web::app::logging::init();
    dioxus::launch(app_root);
}
