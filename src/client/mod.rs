pub mod api;
pub mod download;
pub mod orchestrator;

pub use api::{HttpProxyClient, ProxyApi};
pub use download::{download_filename, download_image};
pub use orchestrator::{
    LogNotifier, Notifier, Orchestrator, PipelineError, PipelineState, Stage, SubmitError,
    FAILURE_ALERT,
};

/// Suggestions offered when the prompt box is empty.
pub const EXAMPLE_PROMPTS: [&str; 5] = [
    "a funky pop art of a cat wearing sunglasses",
    "vibrant comic book scene with a superhero toast",
    "pop art banana with comic book halftone style",
    "retro pop art robot dancing disco",
    "comic book style pizza slice with superpowers",
];
