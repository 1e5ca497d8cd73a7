use std::io::{self, Write};

use similarity_core::{AppViewModel, SessionState};

/// Prints only what changed since the previous render.
#[derive(Default)]
pub struct Renderer {
    rows_printed: usize,
    errors_printed: usize,
    last_percent: Option<u32>,
    last_session: Option<SessionState>,
}

impl Renderer {
    pub fn render(&mut self, view: &AppViewModel) {
        let stdout = io::stdout();
        let stderr = io::stderr();
        let _ = self.render_to(view, &mut stdout.lock(), &mut stderr.lock());
    }

    fn render_to(
        &mut self,
        view: &AppViewModel,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<()> {
        if self.last_session != Some(view.session) {
            let label = match view.session {
                SessionState::Idle => "idle",
                SessionState::Running => "comparing",
                SessionState::Stopping => "stopping",
            };
            let root = view.root.as_deref().unwrap_or("-");
            writeln!(out, "[{label}] {root}")?;
            self.last_session = Some(view.session);
        }

        // Clear reduces the row count; start over from the new table.
        if view.rows.len() < self.rows_printed {
            self.rows_printed = 0;
        }
        for row in &view.rows[self.rows_printed..] {
            writeln!(
                out,
                "{:>7}  {}  {}",
                row.similarity, row.file_a, row.file_b
            )?;
        }
        self.rows_printed = view.rows.len();

        let percent = (view.progress * 100.0).floor() as u32;
        if self.last_percent != Some(percent) {
            writeln!(out, "progress {percent:>3}%")?;
            self.last_percent = Some(percent);
        }

        if view.errors.len() < self.errors_printed {
            self.errors_printed = 0;
        }
        for message in &view.errors[self.errors_printed..] {
            writeln!(err, "error: {message}")?;
        }
        self.errors_printed = view.errors.len();

        out.flush()?;
        err.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::Renderer;
    use similarity_core::AppViewModel;

    fn render(renderer: &mut Renderer, view: &AppViewModel) -> (String, String) {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        renderer.render_to(view, &mut out, &mut err).unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn every_error_since_last_render_is_printed_once() {
        let mut renderer = Renderer::default();
        let mut view = AppViewModel {
            errors: vec!["first".to_string()],
            ..AppViewModel::default()
        };
        let (_, err) = render(&mut renderer, &view);
        assert_eq!(err, "error: first\n");

        view.errors.push("second".to_string());
        view.errors.push("third".to_string());
        let (_, err) = render(&mut renderer, &view);
        assert_eq!(err, "error: second\nerror: third\n");

        let (out, err) = render(&mut renderer, &view);
        assert_eq!(out, "");
        assert_eq!(err, "");
    }
}
