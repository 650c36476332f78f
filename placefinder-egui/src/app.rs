use egui::{Align, Color32, Layout, RichText, ScrollArea, TextEdit, Ui};
use placefinder::app::{Event, MapStatus};
use placefinder::placefinder_types::GeoCoordinates;
use placefinder::search::{HereSearchEngine, Place};
use placefinder::{PlaceFinder, SdkEngine};
use serde::{Deserialize, Serialize};

use crate::galileo_engine::GalileoMapEngine;

pub(crate) const STORAGE_KEY: &str = "placefinder_egui_app";

const SUGGESTIONS_MAX_HEIGHT: f32 = 240.0;
const NEARBY_DEFAULT_HEIGHT: f32 = 180.0;

/// Values kept between runs.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppStorage {
    pub camera: Option<GeoCoordinates>,
}

/// The single screen of the application: search bar on top, map in the middle and nearby
/// addresses at the bottom.
pub struct PlacefinderApp {
    finder: PlaceFinder<GalileoMapEngine, HereSearchEngine>,
    // Keeps the search engine alive; disposed on drop.
    _sdk: SdkEngine,
    query: String,
    last_camera: Option<GeoCoordinates>,
    events: Vec<Event>,
}

impl PlacefinderApp {
    pub(crate) fn new(
        mut finder: PlaceFinder<GalileoMapEngine, HereSearchEngine>,
        sdk: SdkEngine,
    ) -> Self {
        finder.start();

        Self {
            finder,
            _sdk: sdk,
            query: String::new(),
            last_camera: None,
            events: vec![],
        }
    }

    fn search_bar(&mut self, ui: &mut Ui) {
        let release_focus = self.finder.take_focus_release();
        let state = self.finder.state();

        ui.add_enabled_ui(state.is_search_enabled(), |ui| {
            ui.horizontal(|ui| {
                if state.is_search_active() {
                    if ui.button("⬅").on_hover_text("Back").clicked() {
                        self.events.push(Event::BackPressed);
                    }
                } else if ui.button("🔍").on_hover_text("Search").clicked() {
                    self.events.push(Event::SearchActiveChanged(true));
                }

                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if !self.query.is_empty() && ui.button("✖").on_hover_text("Clear").clicked() {
                        self.events.push(Event::ClearPressed);
                    }

                    let response = ui.add(
                        TextEdit::singleline(&mut self.query)
                            .hint_text("Search places")
                            .desired_width(f32::INFINITY),
                    );

                    if response.gained_focus() {
                        self.events.push(Event::SearchActiveChanged(true));
                    }
                    if response.changed() {
                        self.events.push(Event::QueryChanged(self.query.clone()));
                    }
                    if response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter))
                    {
                        self.events.push(Event::SearchSubmitted);
                    }
                    if release_focus {
                        response.surrender_focus();
                    }
                });
            });

            let suggestions = state.visible_suggestions();
            if !suggestions.is_empty() {
                ui.separator();
                ScrollArea::vertical()
                    .id_salt("suggestions")
                    .max_height(SUGGESTIONS_MAX_HEIGHT)
                    .show(ui, |ui| {
                        for place in suggestions {
                            if place_entry(ui, place).clicked() {
                                self.events.push(Event::SuggestionSelected(place.clone()));
                            }
                        }
                    });
            }
        });

        self.status_line(ui);
    }

    fn status_line(&mut self, ui: &mut Ui) {
        let state = self.finder.state();

        ui.horizontal(|ui| match state.map_status() {
            MapStatus::Loading => {
                ui.spinner();
                ui.label("Loading map…");
            }
            MapStatus::Failed(error) => {
                ui.colored_label(Color32::RED, format!("Map could not be loaded: {error}"));
                if ui.button("Retry").clicked() {
                    self.events.push(Event::RetrySceneLoad);
                }
            }
            MapStatus::Ready => {
                if let Some(status) = state.status() {
                    ui.colored_label(Color32::from_rgb(200, 120, 0), status.to_string());
                    if ui.small_button("Dismiss").clicked() {
                        self.events.push(Event::DismissStatus);
                    }
                } else if state.is_suggestion_pending() || state.is_nearby_pending() {
                    ui.spinner();
                }
            }
        });
    }

    fn nearby_list(&mut self, ui: &mut Ui) {
        let state = self.finder.state();

        ui.heading("Suggested addresses");
        if let Some(selected) = state.selected_place() {
            ui.label(RichText::new(format!("Near {}", selected.title())).weak());
        }
        ui.separator();

        let nearby = state.nearby_places();
        if nearby.is_empty() {
            ui.label("Select a place to see addresses around it.");
            return;
        }

        ScrollArea::vertical().id_salt("nearby").show(ui, |ui| {
            for place in nearby {
                if place_entry(ui, place).clicked() {
                    self.events.push(Event::NearbyPlaceSelected(place.clone()));
                }
            }
        });
    }

    fn track_camera(&mut self) {
        let center = self.finder.surface().engine().center();
        if center.is_some() && center != self.last_camera {
            self.last_camera = center;
            if let Some(center) = center {
                self.events.push(Event::CameraMoved(center));
            }
        }
    }

    fn dispatch_events(&mut self) {
        for event in std::mem::take(&mut self.events) {
            self.finder.dispatch(event);
        }

        let query = self.finder.state().query();
        if query != self.query {
            self.query = query.to_string();
        }
    }
}

fn place_entry(ui: &mut Ui, place: &Place) -> egui::Response {
    let mut text = place.title().to_string();
    if let Some(address) = place.address().filter(|address| address.text() != place.title()) {
        text.push('\n');
        text.push_str(address.text());
    }
    if let Some(distance) = place.distance() {
        text.push_str(&format!(" ({distance:.0} m)"));
    }

    ui.selectable_label(false, text)
}

impl eframe::App for PlacefinderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.finder.process_responses();
        self.finder.surface_mut().engine_mut().refresh();

        egui::TopBottomPanel::top("search_bar").show(ctx, |ui| self.search_bar(ui));
        egui::TopBottomPanel::bottom("nearby_places")
            .resizable(true)
            .default_height(NEARBY_DEFAULT_HEIGHT)
            .show(ctx, |ui| self.nearby_list(ui));
        egui::CentralPanel::default().show(ctx, |ui| {
            self.finder
                .surface_mut()
                .engine_mut()
                .state_mut()
                .render(ui);
        });

        self.track_camera();
        self.dispatch_events();
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(
            storage,
            STORAGE_KEY,
            &AppStorage {
                camera: self.last_camera,
            },
        );
    }
}
