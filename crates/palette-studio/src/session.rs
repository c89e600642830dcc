//! Scripted pointer session against the headless toolkit.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use palette_engine::coords::{Point, Rect, Size};
use palette_engine::input::platform::winit::translate_window_event;
use palette_engine::input::{CrossingDetail, CrossingEvent, InputEvent, MotionDetail, MotionEvent};
use palette_engine::time::{Clock, ManualClock};
use palette_ui::config::PaletteConfig;
use palette_ui::context::PaletteContext;
use palette_ui::event::PaletteEvent;
use palette_ui::headless::{HeadlessCanvasItem, HeadlessContent, HeadlessToolkit, HeadlessToplevel, HeadlessWidget};
use palette_ui::invoker::{CanvasInvoker, WidgetInvoker};
use palette_ui::menu::{ActionButton, MenuItem};
use palette_ui::palette::Palette;
use palette_ui::position::Placement;
use palette_ui::toolkit::Toolkit;
use winit::event::WindowEvent;

const SCREEN: Size = Size::new(1024, 768);
const SCALE_FACTOR: f64 = 1.0;

#[derive(Debug, Clone)]
pub enum Step {
    /// Pointer enters the named palette's invoker.
    Hover(&'static str),
    /// Pointer leaves the named palette's invoker.
    Leave(&'static str),
    /// Pointer crosses into the named palette's popup.
    EnterPopup(&'static str),
    LeavePopup(&'static str),
    MovePointer(Point),
    Wait(u64),
    /// Removes a menu item by index from the named palette.
    RemoveItem(&'static str, usize),
    SetFocus(bool),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Hover(name) => write!(f, "hover {name}"),
            Step::Leave(name) => write!(f, "leave {name}"),
            Step::EnterPopup(name) => write!(f, "enter {name} popup"),
            Step::LeavePopup(name) => write!(f, "leave {name} popup"),
            Step::MovePointer(p) => write!(f, "move to ({}, {})", p.x, p.y),
            Step::Wait(ms) => write!(f, "wait {ms}ms"),
            Step::RemoveItem(name, index) => write!(f, "remove {name}[{index}]"),
            Step::SetFocus(focused) => write!(f, "focus {}", if *focused { "in" } else { "out" }),
        }
    }
}

/// Hovers across the toolbar, lingers, hops to a rival, then loses focus.
pub fn default_script() -> Vec<Step> {
    vec![
        Step::Hover("Document"),
        Step::Wait(100),
        Step::Leave("Document"),
        Step::Wait(700),
        Step::Hover("Document"),
        Step::Wait(1000),
        Step::EnterPopup("Document"),
        Step::Leave("Document"),
        Step::RemoveItem("Document", 5),
        Step::LeavePopup("Document"),
        Step::Hover("Share"),
        Step::Wait(300),
        Step::Leave("Share"),
        Step::MovePointer(Point::new(1000, 740)),
        Step::Hover("Sticker"),
        Step::Wait(1000),
        Step::SetFocus(false),
        Step::Wait(1000),
    ]
}

enum InvokerHandle {
    Widget(Rc<WidgetInvoker>),
    Canvas(Rc<CanvasInvoker>),
}

struct Entry {
    name: &'static str,
    palette: Palette,
    invoker: InvokerHandle,
}

struct Session {
    toolkit: Rc<HeadlessToolkit>,
    clock: Rc<ManualClock>,
    ctx: PaletteContext,
    window: Rc<HeadlessToplevel>,
    entries: Vec<Entry>,
    started: Instant,
    transcript: Rc<RefCell<Vec<String>>>,
}

impl Session {
    fn new(config: PaletteConfig) -> Self {
        let toolkit = HeadlessToolkit::new(SCREEN);
        let clock = Rc::new(ManualClock::new());
        let ctx = PaletteContext::new(toolkit.clone(), clock.clone(), config);
        let window = toolkit.create_toplevel();
        let started = clock.now();

        let mut session = Self {
            toolkit,
            clock,
            ctx,
            window,
            entries: Vec::new(),
            started,
            transcript: Rc::default(),
        };
        session.build_toolbar();
        session
    }

    fn build_toolbar(&mut self) {
        let document = self.widget_entry("Document", Rect::new(8, 4, 48, 48));
        document.palette.append_menu_item(MenuItem::new("Rename").accel_path("<Palette>/Rename"));
        document.palette.append_menu_item(MenuItem::new("Duplicate"));
        document.palette.append_button(ActionButton::new("Keep"));
        self.entries.push(document);

        let share = self.widget_entry("Share", Rect::new(64, 4, 48, 48));
        share.palette.set_placement(Placement::Right);
        share.palette.set_content(Box::new(HeadlessContent::new(Size::new(160, 90))));
        self.entries.push(share);

        let item = HeadlessCanvasItem::new(&self.window, Some(Point::new(960, 700)), Size::new(48, 48));
        let invoker = Rc::new(CanvasInvoker::new(self.toolkit.clone(), item));
        let sticker = Palette::new(&self.ctx, "Sticker", None);
        sticker.append_menu_item(MenuItem::new("Pin"));
        sticker.set_invoker(&invoker);
        self.watch("Sticker", &sticker);
        self.entries.push(Entry { name: "Sticker", palette: sticker, invoker: InvokerHandle::Canvas(invoker) });

        for entry in &self.entries {
            entry.palette.set_group_id(Some("toolbar"));
        }
    }

    fn widget_entry(&self, name: &'static str, allocation: Rect) -> Entry {
        let widget = HeadlessWidget::new(&self.window, Point::new(0, 0), allocation);
        let invoker = Rc::new(WidgetInvoker::new(self.toolkit.clone(), widget));
        let palette = Palette::new(&self.ctx, name, None);
        palette.set_invoker(&invoker);
        self.watch(name, &palette);
        Entry { name, palette, invoker: InvokerHandle::Widget(invoker) }
    }

    fn watch(&self, name: &'static str, palette: &Palette) {
        let transcript = Rc::clone(&self.transcript);
        let clock = Rc::clone(&self.clock);
        let started = self.started;
        palette.connect(move |ev| {
            let at = clock.now().duration_since(started).as_millis();
            let what = match ev {
                PaletteEvent::Popup => "up",
                PaletteEvent::Popdown => "down",
            };
            transcript.borrow_mut().push(format!("{at:>6}ms  {name} {what}"));
        });
    }

    fn entry(&self, name: &str) -> Result<&Entry> {
        match self.entries.iter().find(|e| e.name == name) {
            Some(entry) => Ok(entry),
            None => bail!("no palette named '{name}'"),
        }
    }

    fn elapsed_ms(&self) -> u128 {
        self.clock.now().duration_since(self.started).as_millis()
    }

    fn note(&self, line: String) {
        self.transcript.borrow_mut().push(line);
    }

    fn pointer(&self, entry: &Entry, enter: bool) {
        match &entry.invoker {
            InvokerHandle::Widget(invoker) => {
                let crossing = if enter {
                    CrossingEvent::enter(CrossingDetail::Nonlinear)
                } else {
                    CrossingEvent::leave(CrossingDetail::Nonlinear)
                };
                invoker.handle_crossing(&crossing);
            }
            InvokerHandle::Canvas(invoker) => {
                let detail = if enter { MotionDetail::Enter } else { MotionDetail::Leave };
                let position = self.toolkit.pointer_position();
                invoker.handle_motion(&MotionEvent { detail, position });
            }
        }
    }

    /// Feeds a window event through the same translation a winit event loop uses.
    fn window_event(&self, event: &WindowEvent) {
        if let Some(input) = translate_window_event(SCALE_FACTOR, event) {
            self.toolkit.apply_event(&input);
            self.window.apply_event(&input);
        }
    }

    /// Advances the clock by `ms`, stopping at every frame deadline.
    fn wait(&self, ms: u64) {
        let target = self.clock.now() + Duration::from_millis(ms);
        while let Some(deadline) = self.ctx.next_deadline().filter(|d| *d <= target) {
            let now = self.clock.now();
            if deadline > now {
                self.clock.advance(deadline - now);
            }
            self.ctx.tick();
        }
        let now = self.clock.now();
        if target > now {
            self.clock.advance(target - now);
        }
    }

    fn step(&self, step: &Step) -> Result<()> {
        self.note(format!("{:>6}ms  > {step}", self.elapsed_ms()));
        match step {
            Step::Hover(name) => self.pointer(self.entry(name)?, true),
            Step::Leave(name) => self.pointer(self.entry(name)?, false),
            Step::EnterPopup(name) => {
                self.entry(name)?
                    .palette
                    .handle_surface_crossing(&CrossingEvent::enter(CrossingDetail::Nonlinear));
            }
            Step::LeavePopup(name) => {
                self.entry(name)?
                    .palette
                    .handle_surface_crossing(&CrossingEvent::leave(CrossingDetail::Nonlinear));
            }
            Step::MovePointer(p) => self.toolkit.apply_event(&InputEvent::PointerMoved(*p)),
            Step::Wait(ms) => self.wait(*ms),
            Step::RemoveItem(name, index) => {
                if let Err(err) = self.entry(name)?.palette.remove_menu_item(*index) {
                    log::warn!("{name}: {err}");
                    self.note(format!("{:>6}ms  ! {err}", self.elapsed_ms()));
                }
            }
            Step::SetFocus(focused) => self.window_event(&WindowEvent::Focused(*focused)),
        }
        Ok(())
    }

    fn summary(&self) -> String {
        let states: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("{}={:?}", e.name, e.palette.state()))
            .collect();
        format!(
            "final: {}  (toolbar up: {})",
            states.join(" "),
            self.ctx.groups().is_up("toolbar")
        )
    }
}

/// Runs `script` and returns the transcript of steps and palette transitions.
pub fn run(config: PaletteConfig, script: &[Step]) -> Result<Vec<String>> {
    let session = Session::new(config);
    for step in script {
        session.step(step)?;
        log::debug!("after '{step}': {}", session.summary());
    }
    session.note(session.summary());
    let transcript = session.transcript.borrow().clone();
    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transitions(lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .filter(|l| l.ends_with(" up") || l.ends_with(" down"))
            .map(|l| l.trim_start().split_once("  ").map(|(_, rest)| rest.to_owned()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn default_script_shows_each_palette_in_turn() {
        let lines = run(PaletteConfig::default(), &default_script()).unwrap();
        assert_eq!(
            transitions(&lines),
            vec![
                "Document up",
                "Document down",
                "Share up",
                "Share down",
                "Sticker up",
                "Sticker down",
            ]
        );
        assert!(lines.iter().any(|l| l.contains("out of range")));
        assert!(lines.last().unwrap().contains("toolbar up: false"));
    }

    #[test]
    fn quick_hover_produces_no_transition() {
        let script = [Step::Hover("Share"), Step::Wait(100), Step::Leave("Share"), Step::Wait(1000)];
        let lines = run(PaletteConfig::default(), &script).unwrap();
        assert!(transitions(&lines).is_empty());
    }

    #[test]
    fn shorter_popup_delay_shows_sooner() {
        let mut config = PaletteConfig::default();
        config.apply_override("popup.duration_ms", "100").unwrap();
        let lines = run(config, &[Step::Hover("Document"), Step::Wait(100)]).unwrap();
        assert!(lines.iter().any(|l| l.trim_start().starts_with("100ms  Document up")));
    }

    #[test]
    fn window_focus_loss_hides_open_palette() {
        let script = [Step::Hover("Document"), Step::Wait(1000), Step::SetFocus(false)];
        let lines = run(PaletteConfig::default(), &script).unwrap();
        assert_eq!(transitions(&lines), vec!["Document up", "Document down"]);
        assert!(lines.last().unwrap().contains("Document=Hidden"));
    }

    #[test]
    fn unknown_palette_is_an_error() {
        assert!(run(PaletteConfig::default(), &[Step::Hover("Nope")]).is_err());
    }
}
