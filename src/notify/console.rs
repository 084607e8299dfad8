use super::Notifier;
use tracing::{error, info};

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify_success(&self, message: &str) {
        info!("{}", message);
    }

    fn notify_error(&self, message: &str) {
        error!("{}", message);
    }
}
