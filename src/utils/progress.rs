//! Spinners for long-running commands; no-ops when the `progress` feature is disabled

#[cfg(feature = "progress")]
mod bar {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Duration;

    /// A steady-ticking spinner, or nothing when `silent`
    pub struct Spinner(Option<ProgressBar>);

    impl Spinner {
        pub fn start(message: &str, silent: bool) -> Self {
            if silent {
                return Self(None);
            }

            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                spinner.set_style(style);
            }
            spinner.set_message(message.to_string());
            spinner.enable_steady_tick(Duration::from_millis(80));
            Self(Some(spinner))
        }

        pub fn set_message(&self, message: &str) {
            if let Some(ref spinner) = self.0 {
                spinner.set_message(message.to_string());
            }
        }

        pub fn finish(self, message: &str) {
            if let Some(spinner) = self.0 {
                spinner.finish_with_message(message.to_string());
            }
        }
    }
}

#[cfg(not(feature = "progress"))]
mod bar {
    pub struct Spinner;

    impl Spinner {
        pub fn start(_message: &str, _silent: bool) -> Self {
            Spinner
        }

        pub fn set_message(&self, _message: &str) {}

        pub fn finish(self, _message: &str) {}
    }
}

pub use bar::Spinner;
