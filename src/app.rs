use crossterm::event::KeyCode;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use ratatui::widgets::ListState;

use crate::config::Config;
use crate::model::Prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Done,
    Cancelled,
}

/// State of the setup wizard: a queue of prompts answered one at a time.
pub struct Wizard {
    pub prompts: Vec<Prompt>,
    pub current: usize,
    pub input: String,
    pub displayed_choices: Vec<String>,
    pub list_state: ListState,
    pub search_mode: bool,
    pub search_query: String,
    pub message: Option<String>,
}

impl Wizard {
    pub fn new(prompts: Vec<Prompt>) -> Self {
        let mut wizard = Self {
            prompts,
            current: 0,
            input: String::new(),
            displayed_choices: Vec::new(),
            list_state: ListState::default(),
            search_mode: false,
            search_query: String::new(),
            message: None,
        };
        wizard.begin_prompt();
        wizard
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompts.get(self.current)
    }

    pub fn is_done(&self) -> bool {
        self.current >= self.prompts.len()
    }

    fn begin_prompt(&mut self) {
        self.search_mode = false;
        self.search_query.clear();
        self.input = match self.prompt() {
            Some(Prompt::Text { value, .. }) => value.clone(),
            _ => String::new(),
        };
        apply_search(self);
    }

    pub fn selected_choice(&self) -> Option<&String> {
        self.list_state
            .selected()
            .and_then(|i| self.displayed_choices.get(i))
    }

    /// Feed one key press. Accepted answers are written straight into `config`
    /// through its validating setters; a rejected answer keeps the prompt open.
    pub fn handle_key(&mut self, code: KeyCode, config: &mut Config) -> KeyOutcome {
        let Some(prompt) = self.prompt() else {
            return KeyOutcome::Done;
        };
        let field = prompt.field();
        let is_text = matches!(prompt, Prompt::Text { .. });

        if self.search_mode {
            match code {
                KeyCode::Esc => {
                    self.search_mode = false;
                    self.search_query.clear();
                    apply_search(self);
                }
                KeyCode::Enter => {
                    self.search_mode = false;
                }
                KeyCode::Backspace => {
                    self.search_query.pop();
                    apply_search(self);
                }
                KeyCode::Char(c) => {
                    self.search_query.push(c);
                    apply_search(self);
                }
                _ => {}
            }
            return KeyOutcome::Continue;
        }

        match code {
            KeyCode::Esc => return KeyOutcome::Cancelled,
            KeyCode::Enter => {
                let answer = if is_text {
                    Some(self.input.trim().to_string())
                } else {
                    self.selected_choice().cloned()
                };
                match answer {
                    Some(answer) if !answer.is_empty() => match config.set_field(field, &answer) {
                        Ok(()) => {
                            self.message = None;
                            self.current += 1;
                            if self.is_done() {
                                return KeyOutcome::Done;
                            }
                            self.begin_prompt();
                        }
                        Err(e) => self.message = Some(e.to_string()),
                    },
                    _ => self.message = Some("A value is required".into()),
                }
            }
            KeyCode::Backspace if is_text => {
                self.input.pop();
            }
            KeyCode::Char(c) if is_text => self.input.push(c),
            KeyCode::Char('/') => {
                self.search_mode = true;
                self.search_query.clear();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.displayed_choices.is_empty() {
                    let next = self
                        .list_state
                        .selected()
                        .map_or(0, |i| (i + 1).min(self.displayed_choices.len() - 1));
                    self.list_state.select(Some(next));
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(i) = self.list_state.selected() {
                    self.list_state.select(Some(i.saturating_sub(1)));
                }
            }
            _ => {}
        }
        KeyOutcome::Continue
    }
}

/// Apply the fuzzy filter of the current choice prompt to produce displayed_choices
pub fn apply_search(wizard: &mut Wizard) {
    let choices: &[String] = match wizard.prompts.get(wizard.current) {
        Some(Prompt::Choice { choices, .. }) => choices,
        _ => &[],
    };

    wizard.displayed_choices = if wizard.search_query.is_empty() {
        choices.to_vec()
    } else {
        let matcher = SkimMatcherV2::default();
        let mut results: Vec<(i64, &String)> = choices
            .iter()
            .filter_map(|c| {
                matcher
                    .fuzzy_match(c, &wizard.search_query)
                    .map(|score| (score, c))
            })
            .collect();
        results.sort_by(|a, b| b.0.cmp(&a.0));
        results.into_iter().map(|(_, c)| c.clone()).collect()
    };

    // Reset selection to top of filtered list
    if wizard.displayed_choices.is_empty() {
        wizard.list_state.select(None);
    } else {
        wizard.list_state.select(Some(0));
    }
}

/// Best fuzzy match for `query` among `candidates`.
pub fn closest_match<'a>(query: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let matcher = SkimMatcherV2::default();
    candidates
        .into_iter()
        .filter_map(|c| matcher.fuzzy_match(c, query).map(|score| (score, c)))
        .max_by_key(|(score, _)| *score)
        .map(|(_, c)| c)
}
