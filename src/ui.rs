use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::Wizard;
use crate::model::Prompt;

/// Draw the current wizard prompt
pub fn draw_ui(f: &mut Frame<'_>, wizard: &mut Wizard) {
    let area = f.area();
    let outer_block = Block::default().borders(Borders::ALL).title(Span::styled(
        "WoW Next BiS setup",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ));
    let inner = outer_block.inner(area);
    f.render_widget(outer_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(inner);

    let Some(prompt) = wizard.prompt().cloned() else {
        return;
    };

    let step = format!(
        "Step {}/{}: {}",
        wizard.current + 1,
        wizard.prompts.len(),
        prompt.label()
    );
    let header = Paragraph::new(step)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let help_text = match &prompt {
        Prompt::Text { masked, .. } => {
            let shown = if *masked {
                "*".repeat(wizard.input.chars().count())
            } else {
                wizard.input.clone()
            };
            let input = Paragraph::new(format!("{}_", shown))
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL).title("Value"));
            f.render_widget(input, chunks[1]);
            "Enter: Confirm | Esc: Cancel"
        }
        Prompt::Choice { .. } => {
            let title = if wizard.search_mode {
                format!("Search: {}_", wizard.search_query)
            } else if !wizard.search_query.is_empty() {
                format!("Filter: {}", wizard.search_query)
            } else {
                "Choices (Press '/' to filter)".to_string()
            };
            let items: Vec<ListItem> = if wizard.displayed_choices.is_empty() {
                vec![ListItem::new("No matching choices...")]
            } else {
                wizard
                    .displayed_choices
                    .iter()
                    .map(|c| ListItem::new(c.clone()))
                    .collect()
            };
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(title))
                .highlight_style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                );
            f.render_stateful_widget(list, chunks[1], &mut wizard.list_state);
            "↑/↓: Move | /: Filter | Enter: Select | Esc: Cancel"
        }
    };

    let footer = Paragraph::new(wizard.message.clone().unwrap_or_default())
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).title("Message"));
    f.render_widget(footer, chunks[2]);

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);
}
