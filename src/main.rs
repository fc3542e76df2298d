use clap::Parser;
use gopass_credential_helper::core::protocol::ProtocolError;
use std::process::ExitCode;

fn main() -> ExitCode {
    gopass_credential_helper::util::logging::init();
    let cli = gopass_credential_helper::cli::Cli::parse();
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Protocol errors already carry their cause in the message.
            match err.downcast_ref::<ProtocolError>() {
                Some(protocol_err) => eprintln!("{}", protocol_err),
                None => eprintln!("{:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
