//! Interactive vertex-model tissue viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Tissue`], the parameters it
//! was seeded from and the camera, and implements [`eframe::App`] to draw the
//! latest [`Snapshot`] and control the simulation through an egui UI.

use eframe::App;
use glam::DVec2;
use tissue_core::{CellId, Config, Seed, Snapshot, StepReport, Tissue, geometry, phases};
use tracing::{error, info, warn};

/// Initial tessellation used by [`Viewer::reset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layout {
    Hexagonal,
    Square,
}

/// What a click on a cell does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tool {
    Inspect,
    Divide,
    Extrude,
}

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Render the last snapshot: cell outlines, directors and defects.
///
/// ### Fields
/// - `tissue` - The simulated tissue.
/// - `snapshot` - State copy taken after the last step or edit; all drawing reads from it.
/// - `cfg` - Parameters edited in the side panel and pushed into the tissue.
///
/// - `layout`, `rows`, `cols`, `side` - Tessellation rebuilt by [`Viewer::reset`].
/// - `tool` - Action applied to a clicked cell.
/// - `selected` - Last inspected cell.
///
/// - `last_report` - Transition counts of the last step.
/// - `totals` - Transition counts since the last reset.
/// - `last_error` - Message of the error that stopped the run, if any.
///
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `zoom` - Pixels per world unit.
/// - `pan` - Screen-space pan offset in pixels.
///
/// - `step_interval` - Target time between automatic steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time between the last two steps (for display only).
pub struct Viewer {
    tissue: Tissue,
    snapshot: Snapshot,
    cfg: Config,

    layout: Layout,
    rows: usize,
    cols: usize,
    side: f64,
    tool: Tool,
    selected: Option<CellId>,

    show_directors: bool,
    show_defects: bool,

    last_report: StepReport,
    totals: StepReport,
    last_error: Option<String>,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a viewer over an 8 x 8 hexagonal patch with default parameters.
    ///
    /// ### Returns
    /// A fully-initialized [`Viewer`] ready to be passed to `eframe::run_native`.
    pub fn new() -> Self {
        let cfg = Config::default();
        let mut viewer = Self {
            tissue: Tissue::new(cfg),
            snapshot: Snapshot::default(),
            cfg,
            layout: Layout::Hexagonal,
            rows: 8,
            cols: 8,
            side: 0.6,
            tool: Tool::Inspect,
            selected: None,
            show_directors: true,
            show_defects: true,
            last_report: StepReport::default(),
            totals: StepReport::default(),
            last_error: None,
            running: false,
            zoom: 40.0,
            pan: egui::vec2(0.0, 0.0),
            step_interval: 0.05,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        };
        viewer.reset();
        viewer
    }

    fn seed(&self) -> Seed {
        match self.layout {
            Layout::Hexagonal => Seed::hexagonal(self.rows, self.cols, self.side),
            Layout::Square => Seed::square_grid(self.cols, self.rows, self.side),
        }
    }

    /// Rebuilds the tissue from the current layout and `cfg`.
    ///
    /// Stops auto-running, clears the counters and centers the camera on the
    /// new patch. If seeding fails the previous tissue is kept and the error
    /// is shown in the status bar.
    fn reset(&mut self) {
        let seed = self.seed();
        match Tissue::from_seed(self.cfg, &seed, |_| true) {
            Ok(tissue) => {
                self.tissue = tissue;
                self.last_report = StepReport::default();
                self.totals = StepReport::default();
                self.last_error = None;
                self.selected = None;
                self.pan = match seed.bounds() {
                    Some((lo, hi)) => {
                        let mid = (lo + hi) * 0.5;
                        egui::vec2(-(mid.x as f32) * self.zoom, mid.y as f32 * self.zoom)
                    }
                    None => egui::Vec2::ZERO,
                };
            }
            Err(err) => {
                error!(%err, "failed to seed tissue");
                self.last_error = Some(err.to_string());
            }
        }
        self.snapshot = self.tissue.snapshot();
        self.running = false;
    }

    /// Advances the simulation by a single step.
    ///
    /// A fatal step error stops auto-running; the tissue is left as the
    /// failed step left it.
    fn step_once(&mut self) {
        match self.tissue.step() {
            Ok(report) => {
                self.totals.accumulate(&report);
                self.last_report = report;
            }
            Err(err) => {
                error!(step = self.tissue.step_index(), %err, "step failed");
                self.last_error = Some(err.to_string());
                self.running = false;
            }
        }
        self.snapshot = self.tissue.snapshot();
    }

    /// Finds the cell under a world-space point in the last snapshot.
    fn cell_at(&self, p: DVec2) -> Option<CellId> {
        self.snapshot
            .cells
            .iter()
            .find(|cell| geometry::contains_point(&self.snapshot.polygon(cell), p))
            .map(|cell| cell.id)
    }

    /// Applies the current tool to the cell under `p`, if any.
    ///
    /// A successful edit refreshes neighbourhoods, geometry and the order
    /// field before the snapshot is retaken.
    fn apply_tool(&mut self, p: DVec2) {
        let Some(c) = self.cell_at(p) else {
            return;
        };
        let edited = match self.tool {
            Tool::Inspect => {
                self.selected = Some(c);
                return;
            }
            Tool::Divide => self.tissue.divide(c).map(|(a, b)| info!(cell = %c, %a, %b, "divided by hand")),
            Tool::Extrude => self.tissue.extrude(c).map(|m| info!(cell = %c, vertex = %m, "extruded by hand")),
        };
        match edited {
            Ok(()) => {
                self.selected = None;
                self.tissue.find_neighbours();
                phases::geometry_phase(&mut self.tissue);
                phases::order_phase(&mut self.tissue);
                self.snapshot = self.tissue.snapshot();
            }
            Err(err) => {
                warn!(cell = %c, %err, "edit refused");
                self.last_error = Some(err.to_string());
            }
        }
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates are scaled by `zoom`, offset by `pan`, and then
    /// centered inside the given `rect`. The y-axis is flipped so that
    /// positive y goes up in world space.
    ///
    /// ### Parameters
    /// - `p` - World-space position.
    /// - `rect` - Screen-space rectangle representing the drawing area.
    ///
    /// ### Returns
    /// The corresponding egui position in screen-space.
    fn world_to_screen(&self, p: DVec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x as f32 * self.zoom + self.pan.x,
            center.y - p.y as f32 * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] up to `f32`
    /// rounding.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> DVec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        DVec2::new(x as f64, y as f64)
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `f64` [`egui::DragValue`].
    fn labeled_drag_f64(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f64,
        range: std::ops::RangeInclusive<f64>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.0..=1.0)
                        .speed(0.01),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("Reseed").clicked() {
                    self.cfg.seed = rand::random();
                    self.reset();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 2.0..=400.0).logarithmic(true).text("Zoom"));

                ui.separator();
                ui.checkbox(&mut self.show_directors, "Directors");
                ui.checkbox(&mut self.show_defects, "Defects");
            });
        });
    }

    /// Builds the bottom status bar (step, entity counts, transitions).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                let (v, e, c) = self.tissue.counts();
                ui.label(format!("V = {v}  E = {e}  C = {c}  χ = {}", self.tissue.euler_characteristic()));
                ui.label(format!(
                    "extrusions = {}  divisions = {}  T1 = {}  splits = {}  deferred = {}",
                    self.totals.extrusions,
                    self.totals.divisions,
                    self.totals.t1_flips,
                    self.totals.splits,
                    self.totals.deferred,
                ));
                if self.last_report.changed_topology() {
                    ui.label(format!(
                        "last step: +{} -{} T1 {}",
                        self.last_report.divisions, self.last_report.extrusions, self.last_report.t1_flips
                    ));
                }
                ui.label(format!(
                    "defects = {} / {}",
                    self.snapshot.cell_defects.len(),
                    self.snapshot.vertex_defects.len()
                ));
                ui.label(format!("step = {}", self.snapshot.step));
                if let Some(msg) = &self.last_error {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, msg);
                }
            });
        });
    }

    /// Builds the right-hand configuration panel for simulation parameters.
    ///
    /// Mechanical and transition parameters are applied on the next step.
    /// Layout, capacities and the RNG seed only take effect on reset.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Mechanics");
                Self::labeled_drag_f64(ui, "target_area:", &mut self.cfg.target_area, 0.01..=10.0, 0.01);
                Self::labeled_drag_f64(ui, "k_area:", &mut self.cfg.k_area, 0.0..=10.0, 0.01);
                Self::labeled_drag_f64(ui, "k_line:", &mut self.cfg.k_line, 0.0..=1.0, 0.001);
                Self::labeled_drag_f64(ui, "line_tension:", &mut self.cfg.line_tension, -1.0..=1.0, 0.005);

                ui.separator();
                ui.label("Transitions");
                Self::labeled_drag_f64(ui, "min_edge_length:", &mut self.cfg.min_edge_length, 0.0..=1.0, 0.001);
                Self::labeled_drag_f64(ui, "t1_length_factor:", &mut self.cfg.t1_length_factor, 1.0..=5.0, 0.01);
                Self::labeled_drag_f64(ui, "min_area:", &mut self.cfg.min_area, 0.0..=10.0, 0.01);
                Self::labeled_drag_f64(ui, "max_area:", &mut self.cfg.max_area, 0.0..=20.0, 0.01);

                ui.separator();
                ui.label("Integration");
                Self::labeled_drag_f64(ui, "dt:", &mut self.cfg.dt, 0.0001..=0.1, 0.0005);
                Self::labeled_drag_f64(ui, "noise:", &mut self.cfg.noise, 0.0..=2.0, 0.005);
                ui.horizontal(|ui| {
                    ui.label("output_interval:");
                    ui.add(egui::DragValue::new(&mut self.cfg.output_interval).range(1..=1000));
                });

                ui.separator();
                ui.label("Layout (on reset)");
                egui::ComboBox::from_label("pattern")
                    .selected_text(format!("{:?}", self.layout))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.layout, Layout::Hexagonal, "Hexagonal");
                        ui.selectable_value(&mut self.layout, Layout::Square, "Square");
                    });
                Self::labeled_drag_usize(ui, "rows:", &mut self.rows, 1..=60, 1.0);
                Self::labeled_drag_usize(ui, "cols:", &mut self.cols, 1..=60, 1.0);
                Self::labeled_drag_f64(ui, "side:", &mut self.side, 0.05..=5.0, 0.01);
                ui.horizontal(|ui| {
                    ui.label("seed:");
                    ui.add(egui::DragValue::new(&mut self.cfg.seed));
                });

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = Config::default();
                }

                if let Some(cell) = self.selected.and_then(|c| self.tissue.cell(c)) {
                    ui.separator();
                    ui.heading("Cell");
                    ui.label(format!("corners = {}", cell.len()));
                    ui.label(format!("area = {:.4}", cell.area()));
                    ui.label(format!("perimeter = {:.4}", cell.perimeter()));
                    ui.label(format!("lambda = {:.4}", cell.lambda()));
                    ui.label(format!("neighbours = {}", cell.neighbours().len()));
                    ui.label(format!("m = {:.3}", cell.m()));
                }
            });

        if self.cfg != *self.tissue.config() {
            self.tissue.set_config(self.cfg);
        }
    }

    /// Builds the small floating toolbar for choosing the click tool.
    fn ui_toolbar(&mut self, ctx: &egui::Context) {
        egui::Area::new("toolbar".into())
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 100.0))
            .movable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(0, 0, 0, 32))
                    .show(ui, |ui| {
                        ui.vertical(|ui| {
                            for (tool, label) in [
                                (Tool::Inspect, "🔍 Inspect"),
                                (Tool::Divide, "✂ Divide"),
                                (Tool::Extrude, "● Extrude"),
                            ] {
                                if ui.selectable_label(self.tool == tool, label).clicked() {
                                    self.tool = tool;
                                }
                            }
                        });
                    });
            });
    }

    /// Draws cells, directors and defects from the last snapshot.
    fn draw_tissue(&self, painter: &egui::Painter, rect: egui::Rect, hover_world: Option<DVec2>) {
        let hovered = match self.tool {
            Tool::Inspect => None,
            _ => hover_world.and_then(|p| self.cell_at(p)),
        };
        let outline = egui::Stroke::new(1.0, egui::Color32::LIGHT_GRAY);

        for cell in &self.snapshot.cells {
            let points: Vec<egui::Pos2> = self
                .snapshot
                .polygon(cell)
                .into_iter()
                .map(|p| self.world_to_screen(p, rect))
                .collect();

            let highlight = if Some(cell.id) == self.selected {
                Some(egui::Color32::from_rgba_unmultiplied(80, 160, 255, 60))
            } else if Some(cell.id) == hovered {
                Some(egui::Color32::from_rgba_unmultiplied(255, 255, 0, 40))
            } else {
                None
            };
            if let Some(fill) = highlight {
                painter.add(egui::Shape::convex_polygon(points.clone(), fill, egui::Stroke::NONE));
            }
            painter.add(egui::Shape::closed_line(points, outline));
        }

        if self.show_directors {
            let stroke = egui::Stroke::new(1.5, egui::Color32::LIGHT_GREEN);
            for cell in &self.snapshot.cells {
                let half = cell.director * cell.lambda.max(0.0).sqrt();
                let a = self.world_to_screen(cell.centroid - half, rect);
                let b = self.world_to_screen(cell.centroid + half, rect);
                painter.line_segment([a, b], stroke);
            }
        }

        if self.show_defects {
            let radius = (self.side as f32 * self.zoom * 0.3).max(3.0);
            for &c in &self.snapshot.cell_defects {
                if let Ok(i) = self.snapshot.cells.binary_search_by_key(&c, |x| x.id) {
                    let cell = &self.snapshot.cells[i];
                    let p = self.world_to_screen(cell.centroid, rect);
                    painter.circle_stroke(p, radius, egui::Stroke::new(2.0, charge_color(cell.m)));
                }
            }
            for &v in &self.snapshot.vertex_defects {
                if let Ok(i) = self.snapshot.vertices.binary_search_by_key(&v, |x| x.id) {
                    let vertex = &self.snapshot.vertices[i];
                    let p = self.world_to_screen(vertex.pos, rect);
                    painter.circle_filled(p, radius * 0.5, charge_color(vertex.m));
                }
            }
        }
    }

    /// Builds the central panel where the tissue is drawn and interacted with.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            let hover_world = response.hover_pos().map(|p| self.screen_to_world(p, rect));

            if response.clicked()
                && let Some(p) = hover_world
            {
                self.apply_tool(p);
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(2.0, 400.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            self.draw_tissue(&painter, rect, hover_world);

            // Auto-run simulation if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

/// Orange for positive winding numbers, cyan for negative.
fn charge_color(m: f64) -> egui::Color32 {
    if m > 0.0 {
        egui::Color32::from_rgb(255, 140, 0)
    } else {
        egui::Color32::from_rgb(0, 200, 255)
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
        self.ui_toolbar(ctx);
    }
}
