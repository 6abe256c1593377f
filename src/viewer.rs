use std::f64::consts;

use egui_extras::Column;
use nalgebra::Vector3;
use orrery::{
    bodies::{CelestialBody, Color, OrbitPaths, SolarSystem},
    clock::{ClockConfig, SimulationClock, SimulationState},
    driver::FrameDriver,
    kepler::orbits,
    time::Days,
};
use tracing::debug;

use crate::{i18n, i18n_args};

const SUN_RADIUS: f32 = 8.0;
const SUN_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 204, 51);
/// Fraction of the half-viewport the outermost orbit fills.
const VIEW_FILL: f32 = 0.92;
const PICK_SLACK: f32 = 4.0;

pub struct OrreryApp {
    system: SolarSystem,
    paths: OrbitPaths,
    driver: FrameDriver,
    selected: Option<usize>,
}

impl OrreryApp {
    pub fn new(cc: &eframe::CreationContext, system: SolarSystem, clock: ClockConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        let paths = system.orbit_paths();
        Self {
            system,
            paths,
            driver: FrameDriver::start(SimulationClock::with_config(clock)),
            selected: None,
        }
    }

    fn show_controls(&mut self, ctx: &egui::Context) {
        egui::Window::new(i18n!("controls-title"))
            .default_width(280.0)
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(8.0, 8.0))
            .show(ctx, |ui| {
                let state = self.driver.state();
                let clock = self.driver.clock_mut();
                ui.horizontal(|ui| {
                    let label = if state.is_playing {
                        i18n!("controls-pause")
                    } else {
                        i18n!("controls-play")
                    };
                    if ui.button(label).clicked() {
                        clock.toggle();
                    }
                    if ui.button(i18n!("controls-reset")).clicked() {
                        clock.reset();
                    }
                });

                let mut days = state.elapsed_days.get();
                if ui.add(elapsed_slider(&mut days)).changed() {
                    clock.scrub(days);
                }

                let mut speed = state.speed_multiplier;
                if ui.add(speed_slider(&mut speed)).changed() {
                    clock.set_speed(speed);
                }

                ui.label(i18n_args!(
                    "controls-readout",
                    "days",
                    format!("{:.1}", state.elapsed_days.get()),
                    "years",
                    format!("{:.2}", state.elapsed_days.years())
                ));

                ui.separator();
                ui.horizontal(|ui| {
                    if self.driver.is_active() {
                        ui.label(i18n!("controls-driver-active"));
                        if ui.button(i18n!("controls-stop")).clicked() {
                            self.driver.cancel();
                        }
                    } else {
                        ui.label(i18n!("controls-driver-stopped"));
                        if ui.button(i18n!("controls-resume")).clicked() {
                            self.driver.resume();
                        }
                    }
                });
            });
    }

    fn show_bodies(&mut self, ctx: &egui::Context, elapsed: Days) {
        egui::SidePanel::right("bodies")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                ui.heading(i18n!("bodies-title"));
                ui.label(i18n_args!("bodies-count", "bodies", self.system.len()));
                ui.separator();

                egui_extras::TableBuilder::new(ui)
                    .striped(true)
                    .column(Column::auto_with_initial_suggestion(72.0).resizable(true))
                    .columns(Column::auto_with_initial_suggestion(48.0).resizable(true), 5)
                    .header(18.0, |mut header| {
                        for key in [
                            "bodies-name",
                            "bodies-distance",
                            "bodies-period",
                            "bodies-eccentricity",
                            "bodies-x",
                            "bodies-z",
                        ] {
                            header.col(|ui| {
                                ui.strong(i18n!(key));
                            });
                        }
                    })
                    .body(|mut body| {
                        for (index, planet) in self.system.iter().enumerate() {
                            let position = planet.position(elapsed);
                            body.row(18.0, |mut row| {
                                row.col(|ui| {
                                    let selected = self.selected == Some(index);
                                    let text = egui::RichText::new(&*planet.name)
                                        .color(color32(planet.color));
                                    if ui.selectable_label(selected, text).clicked() {
                                        self.selected = Some(index);
                                    }
                                });
                                row.col(|ui| {
                                    ui.label(format!("{:.1}", planet.orbit.distance));
                                });
                                row.col(|ui| {
                                    ui.label(format!("{:.2}", planet.orbit.period));
                                });
                                row.col(|ui| {
                                    ui.label(format!("{:.3}", planet.orbit.eccentricity));
                                });
                                row.col(|ui| {
                                    ui.monospace(format!("{:.2}", position.x));
                                });
                                row.col(|ui| {
                                    ui.monospace(format!("{:.2}", position.z));
                                });
                            });
                        }
                    });

                ui.separator();
                match self.selected.and_then(|i| self.system.iter().nth(i)) {
                    Some(planet) => show_details(ui, planet, elapsed),
                    None => {
                        ui.label(i18n!("selected-none"));
                    }
                }
            });
    }

    fn show_scene(&mut self, ctx: &egui::Context, elapsed: Days) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::from_rgb(5, 5, 16)))
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::click());
                let rect = response.rect;
                let extent = self.system.extent().max(f64::EPSILON);
                let scale = (rect.width().min(rect.height()) / 2.0 * VIEW_FILL) / extent as f32;
                let project = |p: &Vector3<f64>| {
                    rect.center() + egui::vec2(p.x as f32 * scale, -(p.z as f32) * scale)
                };

                for (planet, path) in self.system.iter().zip(self.paths.iter()) {
                    let points = path.iter().map(&project).collect::<Vec<_>>();
                    painter.add(egui::Shape::line(
                        points,
                        egui::Stroke::new(1.0, color32(planet.color).gamma_multiply(0.35)),
                    ));
                }

                painter.circle_filled(rect.center(), SUN_RADIUS, SUN_COLOR);

                let mut markers = Vec::with_capacity(self.system.len());
                for (index, planet) in self.system.iter().enumerate() {
                    let center = project(&orbits::position(planet, elapsed));
                    let radius = marker_radius(planet);
                    painter.circle_filled(center, radius, color32(planet.color));
                    if self.selected == Some(index) {
                        if let Some(path) = self.paths.get(index) {
                            painter.add(egui::Shape::line(
                                path.iter().map(&project).collect(),
                                egui::Stroke::new(1.5, color32(planet.color)),
                            ));
                        }
                        painter.circle_stroke(
                            center,
                            radius + 3.0,
                            egui::Stroke::new(1.5, egui::Color32::WHITE),
                        );
                        painter.text(
                            center + egui::vec2(radius + 6.0, 0.0),
                            egui::Align2::LEFT_CENTER,
                            &*planet.name,
                            egui::FontId::proportional(13.0),
                            egui::Color32::LIGHT_GRAY,
                        );
                    }
                    markers.push((index, center, radius));
                }

                if response.clicked() {
                    if let Some(pointer) = response.interact_pointer_pos() {
                        self.selected = markers
                            .iter()
                            .filter(|(_, center, radius)| {
                                center.distance(pointer) <= radius + PICK_SLACK
                            })
                            .min_by(|a, b| a.1.distance(pointer).total_cmp(&b.1.distance(pointer)))
                            .map(|(index, _, _)| *index);
                        debug!("selected body {:?}", self.selected);
                    }
                }
            });
    }
}

impl eframe::App for OrreryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now_ms = ctx.input(|i| i.time) * 1000.0;
        self.driver.on_frame(now_ms);

        self.show_controls(ctx);
        let SimulationState { elapsed_days, .. } = self.driver.state();
        self.show_bodies(ctx, elapsed_days);
        self.show_scene(ctx, elapsed_days);

        if self.driver.is_active() {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.driver.cancel();
    }
}

fn show_details(ui: &mut egui::Ui, planet: &CelestialBody, elapsed: Days) {
    let orbit = &planet.orbit;
    let phase = orbit.phase_angle(elapsed).rem_euclid(2.0 * consts::PI).to_degrees();
    let position = planet.position(elapsed);
    ui.heading(egui::RichText::new(&*planet.name).color(color32(planet.color)));
    egui::Grid::new("selected-body").num_columns(2).show(ui, |ui| {
        let rows = [
            ("selected-color", planet.color.to_string()),
            ("selected-period-days", format!("{:.2}", orbit.period_days())),
            ("selected-semi-minor", format!("{:.3}", orbit.semi_minor_axis())),
            ("selected-focus-offset", format!("{:.3}", orbit.focus_offset())),
            ("selected-periapsis", format!("{:.3}", orbit.periapsis_radius())),
            ("selected-apoapsis", format!("{:.3}", orbit.apoapsis_radius())),
            ("selected-phase", format!("{phase:.1}")),
            (
                "selected-position",
                format!("({:.2}, {:.2}, {:.2})", position.x, position.y, position.z),
            ),
        ];
        for (key, value) in rows {
            ui.label(i18n!(key));
            ui.monospace(value);
            ui.end_row();
        }
    });
}

/// Scrub slider over the usual range. Values outside it are shown as-is
/// rather than pulled back into range.
fn elapsed_slider(days: &mut f64) -> egui::Slider<'_> {
    egui::Slider::new(days, 0.0..=10_000.0)
        .clamp_to_range(false)
        .text(i18n!("controls-elapsed"))
}

fn speed_slider(speed: &mut f64) -> egui::Slider<'_> {
    egui::Slider::new(speed, 0.1..=10.0)
        .logarithmic(true)
        .clamp_to_range(false)
        .text(i18n!("controls-speed"))
}

fn color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgb(color.r(), color.g(), color.b())
}

fn marker_radius(planet: &CelestialBody) -> f32 {
    (planet.size as f32 * 3.0).max(2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lay out `slider` for one headless frame and report whether it changed.
    fn run_slider(value: &mut f64, slider: fn(&mut f64) -> egui::Slider<'_>) -> bool {
        let ctx = egui::Context::default();
        let mut changed = false;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                changed = ui.add(slider(value)).changed();
            });
        });
        changed
    }

    #[test]
    fn speed_outside_slider_range_is_kept() {
        for configured in [50.0, 0.05] {
            let mut speed = configured;
            assert!(!run_slider(&mut speed, speed_slider), "speed {configured}");
            assert_eq!(speed, configured);
        }
    }

    #[test]
    fn elapsed_outside_slider_range_is_kept() {
        let mut days = 25_000.0;
        assert!(!run_slider(&mut days, elapsed_slider));
        assert_eq!(days, 25_000.0);
    }
}
