//! Input handling
//!
//! Maps keyboard events to state transitions with context-sensitive bindings.

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::state::{AppState, FocusedWidget, PAN_STEP};

/// Handle an input event
pub fn handle_event(event: Event, state: &mut AppState) -> Result<()> {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            handle_key_event(key_event, state)
        }
        // Resizes are picked up by the main loop
        _ => Ok(()),
    }
}

/// Handle a key event
fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Result<()> {
    if state.show_help {
        return handle_help_input(key, state);
    }

    if state.load_prompt_active {
        return handle_load_prompt_input(key, state);
    }

    if state.editing {
        return handle_text_input(key, state);
    }

    // Global shortcuts
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            state.should_quit = true;
            return Ok(());
        }
        KeyCode::Char('?') => {
            state.show_help = true;
            return Ok(());
        }
        KeyCode::Tab | KeyCode::BackTab => {
            if key.code == KeyCode::BackTab || key.modifiers.contains(KeyModifiers::SHIFT) {
                state.focus = state.focus.prev();
            } else {
                state.focus = state.focus.next();
            }
            return Ok(());
        }
        KeyCode::Char('l') | KeyCode::Char('L') => {
            state.start_load_prompt();
            return Ok(());
        }
        KeyCode::Char('e') | KeyCode::Char('E') => {
            state.request_export();
            return Ok(());
        }
        _ => {}
    }

    match state.focus {
        FocusedWidget::Settings => handle_settings_input(key, state),
        FocusedWidget::Preview => handle_preview_input(key, state),
    }
}

/// Handle input when help overlay is shown
fn handle_help_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Enter) {
        state.show_help = false;
    }
    Ok(())
}

/// Typing into a metric field
fn handle_text_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => state.stop_editing(),
        KeyCode::Backspace => state.edit_backspace(),
        KeyCode::Char(c) => state.edit_push(c),
        _ => {}
    }
    Ok(())
}

/// Handle input for the interactive load prompt
fn handle_load_prompt_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Esc => state.cancel_load_prompt(),
        KeyCode::Enter => state.submit_load_prompt(),
        KeyCode::Backspace => {
            state.load_prompt_input.pop();
        }
        KeyCode::Char(c) => state.load_prompt_input.push(c),
        _ => {}
    }
    Ok(())
}

/// Handle input for the settings panel
fn handle_settings_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
        8
    } else {
        1
    };

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.prev_setting(),
        KeyCode::Down | KeyCode::Char('j') => state.next_setting(),
        KeyCode::Left | KeyCode::Char('h') => state.adjust_setting(false, step),
        KeyCode::Right => state.adjust_setting(true, step),
        KeyCode::Char('+') | KeyCode::Char('=') => state.adjust_setting(true, 8),
        KeyCode::Char('-') | KeyCode::Char('_') => state.adjust_setting(false, 8),
        KeyCode::Enter | KeyCode::Char(' ') => state.start_editing(),
        _ => {}
    }
    Ok(())
}

/// Arrow keys move the photo inside the preview
fn handle_preview_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
        PAN_STEP * 5.0
    } else {
        PAN_STEP
    };

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.pan_preview(0.0, -step),
        KeyCode::Down | KeyCode::Char('j') => state.pan_preview(0.0, step),
        KeyCode::Left | KeyCode::Char('h') => state.pan_preview(-step, 0.0),
        KeyCode::Right => state.pan_preview(step, 0.0),
        KeyCode::Home => {
            let pan = state.preview.pan();
            state.pan_preview(-pan.x, -pan.y);
        }
        KeyCode::Char('c') | KeyCode::Char('C') => state.cycle_color_support(),
        _ => {}
    }
    Ok(())
}
