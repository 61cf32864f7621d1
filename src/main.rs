mod api;
mod cli;
mod config;
mod models;
mod tracing_setup;
mod ui;
mod validation;

use std::io;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{debug, error, info};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::api::ApiClient;
use crate::cli::Cli;
use crate::ui::{
    appointment_form::{
        handle_input as handle_form_input, render_appointment_form, AppointmentFormAction,
        AppointmentFormState,
    },
    appointment_search::{
        handle_input as handle_search_input, render_appointment_search, AppointmentSearchAction,
        AppointmentSearchState,
    },
    client_detail::{
        handle_input as handle_client_input, render_client_detail, ClientDetailAction,
        ClientDetailState,
    },
    home::{handle_input as handle_home_input, render_home, HomeAction, HomeState},
    Route,
};

// Represents the current screen in the app
#[derive(Clone, Copy, Debug)]
enum AppScreen {
    Home,
    CreateAppointment,
    SearchAppointments,
    ClientDetail,
}

// Main application state
struct AppState {
    api: ApiClient,
    screen: AppScreen,
    home_state: Option<HomeState>,
    form_state: Option<AppointmentFormState>,
    search_state: Option<AppointmentSearchState>,
    client_state: Option<ClientDetailState>,
}

impl AppState {
    fn new(api: ApiClient) -> Self {
        Self {
            api,
            screen: AppScreen::Home,
            home_state: None,
            form_state: None,
            search_state: None,
            client_state: None,
        }
    }

    /// Switch screens; every visit starts from a fresh screen state
    fn open(&mut self, route: Route) {
        debug!(?route, "navigating");
        match route {
            Route::Home => {
                self.home_state = Some(HomeState::new());
                self.screen = AppScreen::Home;
            }
            Route::SearchAppointments { dni } => {
                self.search_state = Some(AppointmentSearchState::new(dni));
                self.screen = AppScreen::SearchAppointments;
            }
            Route::CreateAppointment(prefill) => {
                self.form_state = Some(AppointmentFormState::new(prefill));
                self.screen = AppScreen::CreateAppointment;
            }
            Route::ClientDetail(id) => {
                self.client_state = Some(ClientDetailState::new(id));
                self.screen = AppScreen::ClientDetail;
            }
        }
    }

    /// Run the request the current screen queued, if any.
    ///
    /// Returns true when a request was made so the caller redraws first.
    async fn perform_pending_request(&mut self) -> bool {
        match self.screen {
            AppScreen::Home => {}
            AppScreen::CreateAppointment => {
                if let Some(state) = &mut self.form_state {
                    if let Some(payload) = state.take_pending() {
                        let result = self.api.create_appointment(&payload).await;
                        state.apply_submit_result(result, Instant::now());
                        return true;
                    }
                }
            }
            AppScreen::SearchAppointments => {
                if let Some(state) = &mut self.search_state {
                    if let Some(dni) = state.take_pending() {
                        let result = self.api.search_appointments(&dni).await;
                        state.apply_search_result(dni, result);
                        return true;
                    }
                }
            }
            AppScreen::ClientDetail => {
                if let Some(state) = &mut self.client_state {
                    if let Some(id) = state.take_pending() {
                        let result = self.api.get_client(&id).await;
                        state.apply_fetch_result(result);
                        return true;
                    }
                }
            }
        }
        false
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::init()?.with_api_base_url(cli.api_url.clone());
    tracing_setup::init_tracing(&config)?;

    let api = ApiClient::new(&config)?;
    info!(base_url = config.api_base_url(), "starting appointment manager");

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(api);
    app_state.open(cli.start_route());

    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = %err, "application stopped");
        println!("Error: {}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| match app_state.screen {
            AppScreen::Home => {
                if let Some(state) = &mut app_state.home_state {
                    render_home(f, state);
                }
            }
            AppScreen::CreateAppointment => {
                if let Some(state) = &mut app_state.form_state {
                    render_appointment_form(f, state);
                }
            }
            AppScreen::SearchAppointments => {
                if let Some(state) = &mut app_state.search_state {
                    render_appointment_search(f, state);
                }
            }
            AppScreen::ClientDetail => {
                if let Some(state) = &mut app_state.client_state {
                    render_client_detail(f, state);
                }
            }
        })?;

        // A queued request runs after its loading state has been drawn
        if app_state.perform_pending_request().await {
            continue;
        }

        let should_quit = match app_state.screen {
            AppScreen::Home => handle_home_screen(app_state)?,
            AppScreen::CreateAppointment => handle_form_screen(app_state)?,
            AppScreen::SearchAppointments => handle_search_screen(app_state)?,
            AppScreen::ClientDetail => handle_client_screen(app_state)?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_home_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.home_state {
        match handle_home_input(state)? {
            Some(HomeAction::Exit) => return Ok(true),
            Some(HomeAction::Navigate(route)) => app_state.open(route),
            None => {}
        }
    }

    Ok(false)
}

fn handle_form_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.form_state {
        if let Some(AppointmentFormAction::Navigate(route)) = handle_form_input(state)? {
            app_state.open(route);
        }
    }

    Ok(false)
}

fn handle_search_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.search_state {
        if let Some(AppointmentSearchAction::Navigate(route)) = handle_search_input(state)? {
            app_state.open(route);
        }
    }

    Ok(false)
}

fn handle_client_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.client_state {
        if let Some(ClientDetailAction::Navigate(route)) = handle_client_input(state)? {
            app_state.open(route);
        }
    }

    Ok(false)
}
