use adpost::models::{CandidateFile, ListingForm};
use adpost::validation;
use adpost::workflow::{SubmissionState, SubmissionWorkflow};
use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "adpost")]
#[command(about = "Post a product listing")]
struct CliArgs {
    /// Listing title.
    #[arg(long)]
    title: String,

    /// Asking price.
    #[arg(long)]
    price: String,

    /// Free-text description.
    #[arg(long, default_value = "")]
    description: String,

    /// Path to the listing image (png or jpeg).
    #[arg(long, value_name = "PATH")]
    image: PathBuf,
}

/// Declared media type for a selected path, as a browser would report it.
fn declared_content_type(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png".to_string(),
        Some("jpeg") => "image/jpeg".to_string(),
        Some("jpg") => "image/jpg".to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adpost=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let data = std::fs::read(&args.image)?;
    let name = args
        .image
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid image path: {}", args.image.display()))?;

    let candidate = CandidateFile {
        content_type: declared_content_type(&args.image),
        name,
        data,
    };
    let file = match validation::select_file(candidate) {
        Ok(file) => file,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let workflow = match SubmissionWorkflow::new().await {
        Ok(workflow) => workflow,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    // Cancel the in-flight submission when the user interrupts.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    // Rendering derives from the submission state.
    let mut state_rx = workflow.state();
    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            match &*state_rx.borrow_and_update() {
                SubmissionState::Uploading { percent } => info!("Uploading {:.0}%", percent),
                SubmissionState::Resolving => info!("Resolving image URL"),
                SubmissionState::Recording => info!("Writing product record"),
                _ => {}
            }
        }
    });

    let form = ListingForm {
        title: args.title,
        price: args.price,
        description: args.description,
        file: Some(file),
    };

    match workflow.submit(form, &cancel).await {
        Ok(record_id) => {
            info!("Submission completed (record {})", record_id);
            Ok(())
        }
        Err(e) => {
            error!("Submission failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::declared_content_type;
    use std::path::Path;

    #[test]
    fn test_declared_content_type_for_image_extensions() {
        assert_eq!(declared_content_type(Path::new("lamp.png")), "image/png");
        assert_eq!(declared_content_type(Path::new("lamp.jpeg")), "image/jpeg");
        assert_eq!(declared_content_type(Path::new("lamp.jpg")), "image/jpg");
        assert_eq!(declared_content_type(Path::new("LAMP.PNG")), "image/png");
    }

    #[test]
    fn test_declared_content_type_for_other_extensions() {
        assert_eq!(
            declared_content_type(Path::new("notes.pdf")),
            "application/octet-stream"
        );
        assert_eq!(
            declared_content_type(Path::new("no_extension")),
            "application/octet-stream"
        );
    }
}
