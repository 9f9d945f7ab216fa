//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `courier_core` linkage by building one demo payload.
//! - Keep output deterministic for quick local sanity checks.
//! - Start core file logging when `COURIER_LOG_DIR` names an absolute directory.

use courier_core::{CourierConfig, Email, EmailRegistry, EmailSchema};
use serde_json::json;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "COURIER_LOG_DIR";

fn main() -> ExitCode {
    println!("courier_core version={}", courier_core::core_version());

    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        let level = courier_core::default_log_level();
        match courier_core::init_logging(level, &log_dir) {
            Ok(()) => println!("courier_core logging level={level} log_dir={log_dir}"),
            Err(err) => {
                eprintln!("courier_core logging_error={err}");
                return ExitCode::FAILURE;
            }
        }
    }

    match demo_payload() {
        Ok(payload) => {
            println!("courier_core payload={payload}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("courier_core error={err}");
            ExitCode::FAILURE
        }
    }
}

fn demo_payload() -> Result<String, Box<dyn std::error::Error>> {
    let mut registry = EmailRegistry::new();
    registry.register(
        EmailSchema::named("Notifier::WelcomeEmail")
            .requires(["user_id"])
            .deliver(["user_id"])
            .recipient("address")
            .accessor("address", |email: &Email| {
                Ok(json!(format!("user{}@example.com", email.read("user_id")?)))
            }),
    )?;

    let email = registry.build("welcome", [("user_id", 42)])?;
    let payload = email.payload_with(&CourierConfig::from_env())?;
    Ok(serde_json::to_string(&payload)?)
}
