pub mod headless;
pub mod renderer;
pub mod session;

pub use headless::{launch_headless_browser, BrowserSettings, DESKTOP_USER_AGENT};
pub use renderer::{PageRenderer, RenderedPage};
pub use session::{ChromeRenderer, RenderingSession};
