//! # Hearth Terminal Entry Point
//!
//! ```bash
//! hearth --operator "Ana Cruz" start --cash 1000 13=10
//! hearth produce 13 20
//! hearth count 13 5
//! hearth summary
//! hearth end 2115
//! ```
//!
//! Errors print as `[CODE] message` on stderr; the exit status comes from
//! [`AppError::exit_code`](hearth_terminal_lib::error::AppError::exit_code).

#[tokio::main]
async fn main() {
    hearth_terminal_lib::init_tracing();

    if let Err(err) = hearth_terminal_lib::run(std::env::args().skip(1)).await {
        eprintln!("{}", err);
        std::process::exit(err.exit_code());
    }
}
