//! Setup and diagnostics command handlers.

use lectern::diagnostics::{CHECK_TIMEOUT, run_check};
use lectern::setup::{SetupWizard, initialize};
use lectern::{
    DaemonContext, EnvFile, LecternResult, MailTransport, OpenRouterClient, Settings, SmtpMailer,
    validate_api_key,
};
use std::path::Path;

/// Handle the `setup` command
pub async fn handle_setup(workdir: &Path, env_file: &Path) -> LecternResult<()> {
    let current = Settings::load(workdir, env_file).ok();
    let timezone = lectern::setup::current_timezone(current.as_ref());
    let mut wizard = SetupWizard::new(std::io::stdin().lock(), std::io::stdout());
    let answers = wizard.collect(timezone.as_deref())?;
    drop(wizard);

    let file = EnvFile::new(env_file);
    file.write_answers(&answers)?;
    println!("\nSaved settings to {}", env_file.display());

    let settings = Settings::load(workdir, env_file)?;
    let ctx = DaemonContext::from_settings(settings)?;
    let welcome = initialize(&ctx).await?;
    println!("Welcome lesson: {}", welcome.display());
    println!("Next: run `lectern check`, then `lectern start`.");
    Ok(())
}

/// Handle the `check` command.
///
/// Returns whether both the API and email checks passed. Chat webhook
/// failures are reported but do not fail the command.
pub async fn handle_check(settings: &Settings) -> LecternResult<bool> {
    let driver = OpenRouterClient::with_timeout(
        settings.api_key().clone(),
        settings.api_url().clone(),
        settings.model().clone(),
        CHECK_TIMEOUT,
    )?;
    let mailer = SmtpMailer::from_settings(settings);
    let client = reqwest::Client::builder()
        .timeout(CHECK_TIMEOUT)
        .build()
        .map_err(|e| lectern::ConfigError::new(format!("Failed to build HTTP client: {}", e)))?;
    let mut out = std::io::stdout();
    let summary = run_check(
        settings,
        &driver,
        mailer.as_ref().map(|m| m as &dyn MailTransport),
        &client,
        &mut out,
    )
    .await
    .map_err(|e| lectern::ConfigError::new(format!("Failed to write report: {}", e)))?;
    Ok(summary.api_ok && summary.email_ok)
}

/// Handle the `set-api-key` command
pub fn handle_set_api_key(env_file: &Path, key: &str) -> LecternResult<()> {
    let key = key.trim();
    validate_api_key(key)?;
    EnvFile::new(env_file).set("OPENROUTER_API_KEY", key)?;
    println!("API key updated in {}", env_file.display());
    println!("Run `lectern check` to test it.");
    Ok(())
}
