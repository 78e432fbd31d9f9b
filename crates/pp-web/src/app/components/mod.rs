// UI building blocks shared by the pages

pub mod avatar_menu;
pub mod confirm_dialog;
pub mod image_picker;
pub mod layout;
pub mod navbar;
pub mod notice;
pub mod require_session;
pub mod spinner;

pub use avatar_menu::AvatarMenu;
pub use confirm_dialog::ConfirmDialog;
pub use image_picker::ImagePicker;
pub use layout::Layout;
pub use navbar::NavBar;
pub use notice::{Notice, NoticeKind};
pub use require_session::{RequireSession, use_authorized};
pub use spinner::Spinner;
