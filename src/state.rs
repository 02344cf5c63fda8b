use std::collections::VecDeque;

use chrono::Local;

use crate::combobox::Combobox;
use crate::predict::{PredictionRequest, PredictionResponse};
use crate::team_search::Team;

const LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Home,
    Away,
}

impl Field {
    pub fn other(self) -> Self {
        match self {
            Field::Home => Field::Away,
            Field::Away => Field::Home,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Home => "Home team",
            Field::Away => "Away team",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Result,
}

/// Work requests for the provider thread.
#[derive(Debug)]
pub enum ProviderCommand {
    Search {
        field: Field,
        seq: u64,
        query: String,
    },
    Predict(PredictionRequest),
}

/// Updates flowing back from the provider thread to the UI.
#[derive(Debug)]
pub enum Delta {
    SearchResults {
        field: Field,
        seq: u64,
        teams: Vec<Team>,
    },
    Prediction(Result<PredictionResponse, String>),
    Log(String),
}

pub struct AppState {
    pub screen: Screen,
    pub home: Combobox,
    pub away: Combobox,
    pub focus: Field,
    /// Submit is disabled while a prediction is in flight.
    pub predicting: bool,
    pub last_request: Option<PredictionRequest>,
    pub prediction: Option<PredictionResponse>,
    pub error: Option<String>,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Form,
            home: Combobox::new(),
            away: Combobox::new(),
            focus: Field::Home,
            predicting: false,
            last_request: None,
            prediction: None,
            error: None,
            logs: VecDeque::new(),
        }
    }

    pub fn field(&mut self, field: Field) -> &mut Combobox {
        match field {
            Field::Home => &mut self.home,
            Field::Away => &mut self.away,
        }
    }

    pub fn focused(&mut self) -> &mut Combobox {
        self.field(self.focus)
    }

    pub fn push_log(&mut self, message: impl Into<String>) {
        let line = format!("{} {}", Local::now().format("%H:%M:%S"), message.into());
        if self.logs.len() >= LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(line);
    }

    /// Discards the prediction and clears both fields for a fresh flow.
    pub fn reset_flow(&mut self) {
        self.screen = Screen::Form;
        self.home.reset();
        self.away.reset();
        self.focus = Field::Home;
        self.predicting = false;
        self.last_request = None;
        self.prediction = None;
        self.error = None;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SearchResults { field, seq, teams } => {
            state.field(field).on_results(seq, teams);
        }
        Delta::Prediction(result) => {
            state.predicting = false;
            match result {
                Ok(prediction) => {
                    state.error = None;
                    state.prediction = Some(prediction);
                    state.screen = Screen::Result;
                    state.push_log("[INFO] Prediction ready");
                }
                Err(message) => {
                    state.push_log(format!("[ERROR] {message}"));
                    state.error = Some(message);
                }
            }
        }
        Delta::Log(message) => state.push_log(message),
    }
}
