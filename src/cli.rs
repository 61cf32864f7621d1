use clap::{Parser, Subcommand};

use crate::ui::{AppointmentPrefill, Route};

/// Terminal front end for the appointments API
#[derive(Parser, Debug)]
#[command(name = "appointment-manager", version, about)]
pub struct Cli {
    /// Base URL of the appointments API (overrides API_BASE_URL)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the appointment lookup, searching right away when a DNI is given
    Search {
        /// Eight-digit client DNI
        dni: Option<String>,
    },
    /// Open the new appointment form
    Create {
        /// Client the appointment belongs to
        #[arg(long)]
        client_id: Option<String>,
        /// Client DNI; the field becomes read-only
        #[arg(long)]
        dni: Option<String>,
    },
    /// Show the details of one client
    Client {
        id: String,
    },
}

impl Cli {
    /// Screen shown when the application starts
    pub fn start_route(&self) -> Route {
        match &self.command {
            None => Route::Home,
            Some(Command::Search { dni }) => Route::SearchAppointments { dni: dni.clone() },
            Some(Command::Create { client_id, dni }) => Route::CreateAppointment(AppointmentPrefill {
                client_id: client_id.clone(),
                dni: dni.clone(),
            }),
            Some(Command::Client { id }) => Route::ClientDetail(id.clone()),
        }
    }
}
