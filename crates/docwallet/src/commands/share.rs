//! `share`: flip a document and follow its verification session.

use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use docwallet_core::{
    Face, FlipController, SessionEvent, SessionStatus, VerificationType,
};

use crate::cli::{GlobalOpts, OutputFormat, ShareArgs};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::Wallet;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareView<'a> {
    id: &'a str,
    link: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    barcode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_in_secs: Option<u64>,
}

pub async fn handle(wallet: &Wallet, args: &ShareArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let card = wallet.find_card(&args.id)?;
    let verification = if args.barcode {
        VerificationType::Barcode
    } else {
        VerificationType::Qr
    };

    let flip = FlipController::new(&card, wallet.context.clone());
    flip.flip(Some(verification));

    let session = match flip.face() {
        Face::Verification(_) => flip.session(),
        Face::Recovery(action) => {
            if !global.quiet {
                eprintln!("{}", Painter::new(global.color).warn(&action.title));
            }
            None
        }
        Face::Front => None,
    };
    let Some(session) = session else {
        if let Some(error) = card.error_state() {
            debug!(id = card.id(), error = %error.title, "card is in an error state");
        }
        return Err(CliError::NoCode { id: args.id.clone() });
    };

    let painter = Painter::new(global.color);
    let mut statuses = session.status_stream();
    let mut events = session.subscribe();

    let result = loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break Ok(());
            }
            status = statuses.next() => {
                let Some(status) = status else { break Ok(()) };
                match status {
                    SessionStatus::Idle => {}
                    SessionStatus::Loading => {
                        if !global.quiet {
                            eprintln!("{}", painter.dim("Requesting verification code..."));
                        }
                    }
                    SessionStatus::Ready { link, barcode, expires_in } => {
                        let view = ShareView {
                            id: card.id(),
                            link: &link,
                            barcode: barcode.as_deref().filter(|_| args.barcode),
                            expires_in_secs: expires_in.map(|d| d.as_secs()),
                        };
                        output::print_output(&render_ready(global.output, &view), global.quiet);
                        if !args.watch || expires_in.is_none() {
                            break Ok(());
                        }
                    }
                    SessionStatus::Expired => {
                        if !global.quiet {
                            eprintln!("{}", painter.warn("Code expired"));
                        }
                        break Ok(());
                    }
                    SessionStatus::Offline => {
                        break Err(CliError::Offline {
                            reason: "the verification request did not reach the service".into(),
                        });
                    }
                    SessionStatus::Error(error) => {
                        break Err(CliError::Registry { message: error.title });
                    }
                }
            }
            event = events.recv() => match event {
                Ok(SessionEvent::Tick(countdown)) => {
                    if !global.quiet {
                        eprintln!("{}", painter.dim(&countdown.text));
                    }
                }
                Ok(SessionEvent::Status(_)) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "countdown output lagged"),
                Err(RecvError::Closed) => break Ok(()),
            },
        }
    };

    flip.show_front();
    result
}

fn render_ready(format: OutputFormat, view: &ShareView<'_>) -> String {
    match format {
        OutputFormat::Json => output::render_json(view, false),
        OutputFormat::JsonCompact => output::render_json(view, true),
        OutputFormat::Plain => view.barcode.unwrap_or(view.link).to_owned(),
        OutputFormat::Table => {
            let mut lines = vec![format!("Link:    {}", view.link)];
            if let Some(barcode) = view.barcode {
                lines.push(format!("Barcode: {barcode}"));
            }
            if let Some(secs) = view.expires_in_secs {
                lines.push(format!("Expires: in {secs}s"));
            }
            lines.join("\n")
        }
    }
}
