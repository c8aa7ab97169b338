use eframe::{
    egui::{
        self, menu, scroll_area::ScrollBarVisibility, Align, Align2, CentralPanel, Context, Layout,
        RichText, ScrollArea, TopBottomPanel,
    },
    App, CreationContext,
};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::chat::Sender;
use crate::flow::{AlertKind, View};
use crate::goal::{GoalForm, LEVEL_OPTIONS};
use crate::group::GroupRecord;
use crate::layout::{DashboardLayout, Panel};
use crate::mentor::Mentor;
use crate::plan::StudyPlan;
use crate::resources::Resource;
use crate::settings::{save_settings, Settings};
use crate::theme::{apply_theme, find_theme, parse_color, presets, ThemeConfig};

pub struct MentorApp {
    mentor: Mentor,
    settings: Settings,
    base_path: PathBuf,
    layout: DashboardLayout,
    theme: ThemeConfig,
    form: GoalForm,
    chat_input: String,
}

impl MentorApp {
    pub fn new(
        cc: &CreationContext<'_>,
        mut mentor: Mentor,
        layout: DashboardLayout,
        settings: Settings,
        base_path: PathBuf,
    ) -> Self {
        let theme = find_theme(&settings.ui.theme);
        apply_theme(&theme, &cc.egui_ctx);

        let ctx = cc.egui_ctx.clone();
        mentor.set_waker(move || ctx.request_repaint());

        Self {
            mentor,
            settings,
            base_path,
            layout,
            theme,
            form: GoalForm::default(),
            chat_input: String::new(),
        }
    }

    fn switch_theme(&mut self, name: &str, ctx: &Context) {
        self.theme = find_theme(name);
        apply_theme(&self.theme, ctx);
        self.settings.ui.theme = self.theme.name.clone();
        if let Err(e) = save_settings(&self.settings, &self.base_path) {
            warn!(error = %e, "could not save theme choice");
        }
    }

    fn render_menu_bar(&mut self, ctx: &Context, ui: &mut egui::Ui) {
        menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                for preset in presets() {
                    let selected = self.theme.name == preset.name;
                    if ui.selectable_label(selected, preset.name.clone()).clicked() {
                        self.switch_theme(&preset.name, ctx);
                        ui.close_menu();
                    }
                }
            });

            ui.menu_button("Help", |ui| {
                ui.label(format!("Study Mentor v{}", env!("CARGO_PKG_VERSION")));
                ui.label(format!("Base path: {}", self.base_path.display()));
                ui.label("Answers come from a built-in table; nothing leaves this computer.");
            });
        });
    }

    fn render_onboarding(&mut self, ui: &mut egui::Ui) {
        let muted = parse_color(&self.theme.muted_text);
        ui.vertical_centered(|ui| {
            ui.add_space(32.0);
            ui.heading("🎓 Your study mentor");
            ui.label(
                RichText::new("Tell me what you're studying and I'll put a plan together.")
                    .color(muted),
            );
        });
        ui.add_space(20.0);

        egui::Grid::new("goal_form")
            .num_columns(2)
            .spacing([12.0, 10.0])
            .show(ui, |ui| {
                ui.label("Subject");
                ui.add(
                    egui::TextEdit::singleline(&mut self.form.subject).hint_text("e.g. Calculus"),
                );
                ui.end_row();

                ui.label("Target grade");
                ui.add(egui::TextEdit::singleline(&mut self.form.target_grade).hint_text("e.g. A"));
                ui.end_row();

                ui.label("Current level");
                let selected = if self.form.current_level.is_empty() {
                    "Select...".to_string()
                } else {
                    self.form.current_level.clone()
                };
                egui::ComboBox::from_id_source("current_level")
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for level in LEVEL_OPTIONS {
                            ui.selectable_value(
                                &mut self.form.current_level,
                                level.to_string(),
                                level,
                            );
                        }
                    });
                ui.end_row();
            });

        ui.add_space(14.0);
        let busy = self.mentor.controller().is_loading();
        if ui
            .add_enabled(!busy, egui::Button::new("Create my plan"))
            .clicked()
        {
            if let Err(err) = self.mentor.submit_goal(&self.form) {
                debug!(%err, "goal not accepted");
            }
        }
    }

    fn render_dashboard(&mut self, ui: &mut egui::Ui) {
        let Some(session) = self.mentor.controller().session().cloned() else {
            ui.label("Set a study goal first.");
            return;
        };

        ui.heading(format!("{} study plan", session.goal.subject()));
        ui.label(
            RichText::new(format!(
                "Target: {} | Current level: {}",
                session.goal.target_grade(),
                session.goal.current_level()
            ))
            .color(parse_color(&self.theme.muted_text)),
        );
        ui.separator();

        let panels = self.layout.panels().to_vec();
        ScrollArea::vertical()
            .id_source("dashboard")
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for panel in panels {
                    self.section_frame().show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(
                            RichText::new(panel.title())
                                .strong()
                                .size(self.theme.font_size_base + 3.0),
                        );
                        ui.add_space(6.0);
                        match panel {
                            Panel::Plan => self.render_plan(ui, &session.plan),
                            Panel::Resources => self.render_resources(ui, &session.resources),
                            Panel::Group => self.render_group(ui, session.group.as_ref()),
                            Panel::Chat => self.render_chat(ui),
                        }
                    });
                    ui.add_space(10.0);
                }
            });
    }

    fn section_frame(&self) -> egui::Frame {
        egui::Frame::none()
            .fill(parse_color(&self.theme.surface))
            .stroke(egui::Stroke::new(1.0, parse_color(&self.theme.border)))
            .rounding(egui::Rounding::same(self.theme.radius))
            .inner_margin(egui::vec2(14.0, 12.0))
    }

    fn render_plan(&self, ui: &mut egui::Ui, plan: &StudyPlan) {
        let accent = parse_color(&self.theme.accent);
        let muted = parse_color(&self.theme.muted_text);

        ui.label(RichText::new("📚 Study tips").strong());
        for tip in &plan.tips {
            ui.label(format!("• {tip}"));
        }
        for week in &plan.weeks {
            ui.add_space(8.0);
            ui.label(
                RichText::new(format!("📅 Week {}: {}", week.week, week.title))
                    .strong()
                    .color(accent),
            );
            ui.label(RichText::new(format!("Focus: {}", week.focus)).color(muted));
            for task in &week.tasks {
                ui.label(format!("✓ {task}"));
            }
        }
    }

    fn render_resources(&self, ui: &mut egui::Ui, resources: &[Resource]) {
        let muted = parse_color(&self.theme.muted_text);
        ui.horizontal_wrapped(|ui| {
            for resource in resources {
                egui::Frame::none()
                    .fill(parse_color(&self.theme.panel))
                    .stroke(egui::Stroke::new(1.0, parse_color(&self.theme.border)))
                    .rounding(egui::Rounding::same(6.0))
                    .inner_margin(egui::vec2(10.0, 8.0))
                    .show(ui, |ui| {
                        ui.set_width(200.0);
                        ui.label(RichText::new(&resource.title).strong());
                        ui.add(egui::Label::new(&resource.description).wrap(true));
                        ui.label(
                            RichText::new(format!("Type: {}", resource.kind))
                                .small()
                                .color(muted),
                        );
                    });
            }
        });
    }

    fn render_group(&mut self, ui: &mut egui::Ui, group: Option<&GroupRecord>) {
        let busy = self.mentor.controller().is_loading();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!busy, egui::Button::new("🔍 Find a group"))
                .clicked()
            {
                if let Err(err) = self.mentor.find_group() {
                    self.mentor
                        .controller_mut()
                        .raise_alert(AlertKind::Error, err.user_message());
                }
            }
            if ui
                .add_enabled(!busy, egui::Button::new("➕ Create a group"))
                .clicked()
            {
                if let Err(err) = self.mentor.create_group() {
                    self.mentor
                        .controller_mut()
                        .raise_alert(AlertKind::Error, err.user_message());
                }
            }
        });
        ui.add_space(6.0);

        let Some(group) = group else {
            ui.label(
                RichText::new("No group yet. Find one or start your own.")
                    .color(parse_color(&self.theme.muted_text)),
            );
            return;
        };
        egui::Grid::new("group_info")
            .num_columns(2)
            .spacing([10.0, 4.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Subject").strong());
                ui.label(&group.subject);
                ui.end_row();
                ui.label(RichText::new("Goal").strong());
                ui.label(&group.goal);
                ui.end_row();
                ui.label(RichText::new("Members").strong());
                ui.label(&group.members);
                ui.end_row();
            });
        ui.hyperlink_to("🔗 Join the meeting", &group.link);
    }

    fn render_chat(&mut self, ui: &mut egui::Ui) {
        let max_width = ui.available_width();
        ScrollArea::vertical()
            .id_source("chat_log")
            .max_height(260.0)
            .auto_shrink([false, true])
            .stick_to_bottom(true)
            .scroll_bar_visibility(ScrollBarVisibility::VisibleWhenNeeded)
            .show(ui, |ui| {
                if self.mentor.controller().transcript().is_empty() {
                    ui.label(
                        RichText::new("Ask anything about your subject.")
                            .color(parse_color(&self.theme.muted_text)),
                    );
                }
                for message in self.mentor.controller().transcript().messages() {
                    let is_user = message.sender == Sender::User;
                    let (fill, stroke, name) = if is_user {
                        (&self.theme.accent_soft, &self.theme.accent, "You")
                    } else {
                        (&self.theme.panel, &self.theme.border, "Mentor")
                    };
                    let layout = if is_user {
                        Layout::right_to_left(Align::Min)
                    } else {
                        Layout::left_to_right(Align::Min)
                    };
                    ui.add_space(4.0);
                    ui.with_layout(layout, |ui| {
                        egui::Frame::none()
                            .fill(parse_color(fill))
                            .stroke(egui::Stroke::new(1.0, parse_color(stroke)))
                            .rounding(egui::Rounding::same(6.0))
                            .inner_margin(egui::vec2(10.0, 8.0))
                            .show(ui, |ui| {
                                ui.set_max_width(max_width * 0.75);
                                ui.label(
                                    RichText::new(name)
                                        .strong()
                                        .color(parse_color(&self.theme.muted_text)),
                                );
                                ui.add(egui::Label::new(&message.content).wrap(true));
                            });
                    });
                }
            });

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            let input = ui.add(
                egui::TextEdit::singleline(&mut self.chat_input)
                    .hint_text("Type a question...")
                    .desired_width(max_width - 80.0),
            );
            let enter = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if enter || ui.button("Send").clicked() {
                self.handle_chat_send();
                input.request_focus();
            }
        });
    }

    fn handle_chat_send(&mut self) {
        if self.mentor.send_chat(&self.chat_input) {
            self.chat_input.clear();
        }
    }

    fn render_loading_overlay(&self, ctx: &Context) {
        if !self.mentor.controller().is_loading() {
            return;
        }
        egui::Area::new(egui::Id::new("loading_overlay"))
            .order(egui::Order::Foreground)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Working on it...");
                    });
                });
            });
    }

    fn render_alert(&mut self, ctx: &Context) {
        let Some(alert) = self.mentor.controller().alert().cloned() else {
            return;
        };
        let title = match alert.kind {
            AlertKind::Info => "Notice",
            AlertKind::Error => "Heads up",
        };
        let mut dismissed = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&alert.message);
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.mentor.controller_mut().take_alert();
        }
    }
}

impl App for MentorApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.mentor.pump();

        TopBottomPanel::top("menu_bar").show(ctx, |ui| self.render_menu_bar(ctx, ui));

        let view = self.mentor.controller().view();
        CentralPanel::default().show(ctx, |ui| match view {
            View::Onboarding => self.render_onboarding(ui),
            View::Dashboard => self.render_dashboard(ui),
        });

        self.render_loading_overlay(ctx);
        self.render_alert(ctx);
    }
}

pub fn launch_gui(
    base_path: PathBuf,
    settings: Settings,
    mentor: Mentor,
    layout: DashboardLayout,
) -> eframe::Result<()> {
    let (width, height) = settings.ui.window_size.unwrap_or((960.0, 760.0));
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Study Mentor")
            .with_inner_size([width, height])
            .with_min_inner_size([720.0, 540.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Study Mentor",
        native_options,
        Box::new(move |cc| Box::new(MentorApp::new(cc, mentor, layout, settings, base_path))),
    )
}
