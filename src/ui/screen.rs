use ratatui::Frame;

use crate::app::{App, AppScreen};
use crate::ui::{render_confirm_stop, render_preview};

/// A UI Screen boundary: responsible for rendering one view of the app
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Timer, callout and settings
pub struct WorkoutScreen;

impl Screen for WorkoutScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Sample combos for the current settings, drawn over the workout view
pub struct PreviewScreen;

impl Screen for PreviewScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        WorkoutScreen.render(app, f);
        if let AppScreen::Preview(combos) = &app.screen {
            let area = f.area();
            render_preview(combos, area, f.buffer_mut());
        }
    }
}

pub struct ConfirmStopScreen;

impl Screen for ConfirmStopScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        WorkoutScreen.render(app, f);
        let area = f.area();
        render_confirm_stop(area, f.buffer_mut());
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(screen: &AppScreen) -> Box<dyn Screen> {
    match screen {
        AppScreen::Workout => Box::new(WorkoutScreen),
        AppScreen::Preview(_) => Box::new(PreviewScreen),
        AppScreen::ConfirmStop => Box::new(ConfirmStopScreen),
    }
}
