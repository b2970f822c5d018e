//! Photosweep - Photo Collection Cleanup
//!
//! Entry point for the photosweep CLI application.

use clap::Parser;
use photosweep::{
    cli::Cli,
    error::{ExitCode, StructuredError},
};

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    // Run the application logic
    match photosweep::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            // Determine appropriate exit code for errors
            let interrupted = err
                .downcast_ref::<photosweep::dedupe::DedupeError>()
                .is_some_and(|e| matches!(e, photosweep::dedupe::DedupeError::Interrupted))
                || err
                    .downcast_ref::<photosweep::organize::OrganizeError>()
                    .is_some_and(|e| {
                        matches!(e, photosweep::organize::OrganizeError::Interrupted)
                    });
            let exit_code = if interrupted {
                ExitCode::Interrupted
            } else {
                ExitCode::GeneralError
            };

            // Report the error
            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                if let Ok(json) = serde_json::to_string_pretty(&structured) {
                    eprintln!("{}", json);
                } else {
                    eprintln!("[{}] Error: {}", exit_code.code_prefix(), err);
                }
            } else {
                eprintln!("[{}] Error: {}", exit_code.code_prefix(), err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
