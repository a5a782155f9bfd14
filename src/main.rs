use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Instant;

use anyhow::{anyhow, Context};
use clap::Parser;
use nannou::prelude::*;
use tracing::{debug, error, info};

mod diagram;
mod layout;
mod network;
mod settings;
mod util;

use diagram::*;
use layout::Layout;
use network::{valves, ValveNetwork};
use settings::{Args, Settings};
use util::*;

const SIZE_X: u32 = 1200;
const SIZE_Y: u32 = 800;

const PANEL_WIDTH: f32 = 300.0;
const LEGEND_WIDTH: f32 = 120.0;
const TITLE_HEIGHT: f32 = 60.0;

/// The number of frames to keep running after a snapshot request, so the capture can complete.
const SNAPSHOT_FRAMES: u64 = 10;

/// The startup configuration, resolved before the window opens.
#[derive(Debug, Clone, Default)]
struct Launch {
    settings: Settings,
    snapshot: Option<PathBuf>,
}

static LAUNCH: OnceLock<Launch> = OnceLock::new();

struct Model {
    window: WindowId,
    settings: Settings,
    network: ValveNetwork,
    diagram: Diagram,
    layout: Layout,
    /// The index of the valve adjusted by the keyboard.
    selected: usize,
    mode: DrawingMode,
    /// Render to this file and quit.
    snapshot: Option<PathBuf>,
}

impl Model {
    /// Rebuild the network from the current settings and recompute everything derived from it.
    fn recompute(&mut self) {
        let now = Instant::now();

        self.network = self.settings.network();
        self.diagram = Diagram::new(&self.network);
        self.layout = Layout::fit(&self.diagram, diagram_area());
        self.selected = self.selected.min(self.settings.num_valves() - 1);

        debug!(
            settings = %self.settings.summary(),
            elapsed = ?now.elapsed(),
            "processed valve flow"
        );
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::load(&args).context("failed to load settings")?;

    info!(settings = %settings.summary(), "starting valve system");

    let launch = Launch {
        settings,
        snapshot: args.snapshot,
    };

    LAUNCH
        .set(launch)
        .map_err(|_| anyhow!("launch settings were already set"))?;

    nannou::app(model).update(update).exit(exit).run();

    Ok(())
}

fn model(app: &App) -> Model {
    let window = app
        .new_window()
        .size(SIZE_X, SIZE_Y)
        .title("Valve System Flow")
        .view(view)
        .key_pressed(key_pressed)
        .mouse_released(mouse_released)
        .build()
        .unwrap();

    let launch = LAUNCH.get().cloned().unwrap_or_default();

    let network = launch.settings.network();
    let diagram = Diagram::new(&network);
    let layout = Layout::fit(&diagram, diagram_area());

    if let Some(path) = launch.snapshot.as_ref() {
        capture(app, window, path.clone());
    }

    Model {
        window,
        settings: launch.settings,
        network,
        diagram,
        layout,
        selected: 0,
        mode: DrawingMode::Render,
        snapshot: launch.snapshot,
    }
}

fn update(app: &App, model: &mut Model, _update: Update) {
    if model.snapshot.is_some() && app.elapsed_frames() >= SNAPSHOT_FRAMES {
        app.quit();
    }
}

fn exit(app: &App, model: Model) {
    if let Some(window) = app.window(model.window) {
        if window.await_capture_frame_jobs().is_err() {
            error!("timed out waiting for frame captures to finish");
        }
    }
}

#[derive(Debug, Copy, Clone)]
enum DrawingMode {
    Render,
    DebugValues,
}

fn cycle_drawing_mode(mode: DrawingMode) -> DrawingMode {
    match mode {
        DrawingMode::Render => DrawingMode::DebugValues,
        DrawingMode::DebugValues => DrawingMode::Render,
    }
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    let last = model.settings.num_valves() - 1;

    match key {
        Key::Left => model.selected = model.selected.saturating_sub(1),
        Key::Right => model.selected = (model.selected + 1).min(last),
        Key::Up => model.settings.adjust_percentage(model.selected, 1),
        Key::Down => model.settings.adjust_percentage(model.selected, -1),
        Key::PageUp => model.settings.adjust_layers(1),
        Key::PageDown => model.settings.adjust_layers(-1),
        Key::RBracket => model.settings.adjust_amount(1),
        Key::LBracket => model.settings.adjust_amount(-1),
        Key::R => model.settings.reset_percentages(),
        Key::S => {
            let path = PathBuf::from(format!("valves-{:05}.png", app.elapsed_frames()));
            capture(app, model.window, path);
            return;
        }
        _ => return,
    }

    model.recompute();
}

fn mouse_released(app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        let point = model.layout.to_diagram(app.mouse.position());

        if let Some(index) = model.diagram.nearest_valve(point) {
            model.selected = index;
        }
    }

    if button == MouseButton::Right {
        model.mode = cycle_drawing_mode(model.mode);
    }
}

fn capture(app: &App, window: WindowId, path: PathBuf) {
    match app.window(window) {
        Some(window) => {
            info!(path = %path.display(), "capturing snapshot");
            window.capture_frame(path);
        }
        None => error!(path = %path.display(), "no window to capture"),
    }
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();

    draw.background().color(SNOW);

    render_title(&draw);
    render_pipes(&draw, model);

    match model.mode {
        DrawingMode::Render => {
            render_nodes(&draw, model, 1.0);
            render_labels(&draw, model);
        }
        DrawingMode::DebugValues => {
            render_nodes(&draw, model, 0.35);
            debug_values(&draw, model);
        }
    }

    render_selection(&draw, model);
    render_legend(&draw, model);
    render_panel(&draw, model);

    draw.to_frame(app, &frame).unwrap();
}

/// The window region available to the diagram, between the control panel and the legend.
fn diagram_area() -> Rect {
    let window = Rect::from_w_h(SIZE_X as f32, SIZE_Y as f32);

    let left = window.left() + PANEL_WIDTH;
    let right = window.right() - LEGEND_WIDTH;
    let top = window.top() - TITLE_HEIGHT;
    let bottom = window.bottom();

    Rect::from_corners(pt2(left, bottom), pt2(right, top))
}

fn render_title(draw: &Draw) {
    let area = diagram_area();

    draw.text("Valve System Flow")
        .xy(pt2(area.x(), area.top() + TITLE_HEIGHT * 0.5))
        .w(area.w())
        .font_size(22)
        .color(BLACK);
}

fn render_pipes(draw: &Draw, model: &Model) {
    let color = srgba(0.68, 0.85, 0.9, 0.7);

    for edge in model.diagram.edges.iter() {
        if edge.width <= 0.0 {
            continue;
        }

        let a = model.layout.to_screen(model.diagram.nodes[edge.nodes.0].position);
        let b = model.layout.to_screen(model.diagram.nodes[edge.nodes.1].position);

        draw.line()
            .caps_round()
            .weight(edge.width * 2.0)
            .color(color)
            .points(a, b);
    }
}

fn render_nodes(draw: &Draw, model: &Model, alpha: f32) {
    for node in model.diagram.nodes.iter() {
        let p = model.layout.to_screen(node.position);
        let radius = model.layout.node_radius(node.size);

        draw.ellipse()
            .xy(p)
            .radius(radius)
            .color(node.color.to_srgba(alpha))
            .stroke(GRAY)
            .stroke_weight(2.0);
    }
}

fn render_labels(draw: &Draw, model: &Model) {
    for node in model.diagram.nodes.iter() {
        let p = model.layout.to_screen(node.position);

        // Light labels on the darkest nodes.
        let color = if node.color.as_tuple().0 < 100 {
            WHITE
        } else {
            BLACK
        };

        draw.text(&node.label).xy(p).font_size(10).color(color);
    }
}

fn debug_values(draw: &Draw, model: &Model) {
    for node in model.diagram.nodes.iter() {
        let NodeKind::Valve(index) = node.kind else {
            continue;
        };

        let Some(valve) = model.network.valve(index) else {
            continue;
        };

        let p = model.layout.to_screen(node.position);

        let text = format!(
            "#{} in {:.1}\n{:.1} | {:.1}",
            index, valve.input, valve.output1, valve.output2
        );

        draw.text(&text)
            .xy(p)
            .w(model.layout.unit * 1.6)
            .font_size(10)
            .color(DIMGREY);
    }
}

fn render_selection(draw: &Draw, model: &Model) {
    if let Some(node) = model.diagram.nodes.get(model.selected) {
        let p = model.layout.to_screen(node.position);
        let radius = model.layout.node_radius(node.size) + 5.0;

        draw.ellipse()
            .xy(p)
            .radius(radius)
            .no_fill()
            .stroke(DARKORANGE)
            .stroke_weight(3.0);
    }
}

/// Draw the flow color scale from zero to the initial amount.
fn render_legend(draw: &Draw, model: &Model) {
    const STEPS: usize = 64;

    let window = Rect::from_w_h(SIZE_X as f32, SIZE_Y as f32);
    let bar = Rect::from_x_y_w_h(window.right() - LEGEND_WIDTH * 0.6, 0.0, 20.0, 400.0);

    let step_h = bar.h() / STEPS as f32;

    for i in 0..STEPS {
        let t = (i as f64 + 0.5) / STEPS as f64;
        let y = map_clamp(i as f32, 0.0, STEPS as f32, bar.bottom(), bar.top());

        draw.rect()
            .x_y(bar.x(), y + step_h * 0.5)
            .w_h(bar.w(), step_h + 0.5)
            .color(colorous::BLUES.eval_continuous(t).to_rgb());
    }

    for t in [0.0, 0.5, 1.0] {
        let value = model.diagram.max_flow * t as f64;
        let y = map_clamp(t, 0.0, 1.0, bar.bottom(), bar.top());

        draw.text(&format!("{:.0}", value))
            .x_y(bar.right() + 30.0, y)
            .font_size(10)
            .color(BLACK);
    }

    draw.text("Flow Amount")
        .x_y(bar.x(), bar.top() + 20.0)
        .font_size(12)
        .color(BLACK);
}

/// Draw the per-layer valve controls and the key bindings.
fn render_panel(draw: &Draw, model: &Model) {
    const LINE: f32 = 22.0;
    const COLUMN: f32 = 54.0;

    let window = Rect::from_w_h(SIZE_X as f32, SIZE_Y as f32);
    let left = window.left() + 20.0;
    let mut y = window.top() - 30.0;

    let header = [
        format!("Initial Amount: {}", model.settings.initial_amount),
        format!("Number of Layers: {}", model.settings.num_layers),
        String::from("Valve Percentages (Weights)"),
    ];

    for line in header.iter() {
        panel_text(draw, line, left, y, BLACK);
        y -= LINE;
    }

    let mut layer = usize::MAX;

    for v in valves(model.settings.num_layers) {
        if v.layer != layer {
            layer = v.layer;
            y -= LINE * 1.5;
            panel_text(draw, &format!("Layer {}", layer + 1), left, y, DIMGREY);
            y -= LINE;
        }

        let color = if v.index == model.selected {
            DARKORANGE
        } else {
            BLACK
        };

        let text = format!("V{} {}%", v.position + 1, model.settings.percentage(v.index));
        panel_text(draw, &text, left + v.position as f32 * COLUMN, y, color);
    }

    let help = [
        "left/right: select valve",
        "up/down: percentage",
        "page up/down: layers",
        "[ / ]: initial amount",
        "r: reset, s: snapshot",
        "right click: debug view",
    ];

    let mut y = window.bottom() + 20.0;

    for line in help.iter().rev() {
        panel_text(draw, line, left, y, DIMGREY);
        y += LINE * 0.8;
    }
}

fn panel_text(draw: &Draw, text: &str, left: f32, y: f32, color: Rgb<u8>) {
    const WIDTH: f32 = 260.0;

    draw.text(text)
        .x_y(left + WIDTH * 0.5, y)
        .w(WIDTH)
        .left_justify()
        .font_size(13)
        .color(color);
}
