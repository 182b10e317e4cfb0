use crate::infra::build_check_service;
use clap::Args;
use compliance_portal::checks::{CheckSubmission, UploadedFile};
use compliance_portal::config::AppConfig;
use compliance_portal::error::AppError;
use compliance_portal::telemetry;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Subject full name
    #[arg(long)]
    name: String,
    /// Subject CPF (national identifier)
    #[arg(long)]
    cpf: String,
    /// Subject date of birth (YYYY-MM-DD)
    #[arg(long)]
    dob: String,
    /// Check category: criminal, credit, employment or identity
    #[arg(long = "check-type")]
    check_type: String,
    /// Why the check is being run
    #[arg(long)]
    purpose: String,
    /// Requester e-mail
    #[arg(long)]
    email: String,
    /// Confirm the subject consented to the check
    #[arg(long)]
    consent: bool,
    /// Optional report to attach
    #[arg(long)]
    file: Option<PathBuf>,
}

impl CheckArgs {
    async fn into_submission(self) -> Result<CheckSubmission, AppError> {
        let file = match self.file {
            Some(path) => Some(read_attachment(path).await?),
            None => None,
        };

        Ok(CheckSubmission {
            name: Some(self.name),
            cpf: Some(self.cpf),
            dob: Some(self.dob),
            check_type: Some(self.check_type),
            purpose: Some(self.purpose),
            email: Some(self.email),
            consent: Some(self.consent.to_string()),
            file,
        })
    }
}

async fn read_attachment(path: PathBuf) -> Result<UploadedFile, AppError> {
    let bytes = tokio::fs::read(&path).await?;
    let content_type = mime_guess::from_path(&path)
        .first()
        .map(|mime| mime.essence_str().to_string());
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string);

    Ok(UploadedFile {
        file_name,
        content_type,
        bytes,
    })
}

pub(crate) async fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let service = build_check_service(&config).await?;
    let receipt = service.run(args.into_submission().await?).await?;

    let rendered = serde_json::to_string_pretty(&receipt)
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
    println!("{rendered}");
    Ok(())
}
