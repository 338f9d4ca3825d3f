//! System tray surface for the widget.
//!
//! The tray is the single widget instance on the desktop. A render command
//! becomes a tinted icon, a tooltip with status and traffic, and the label
//! of the toggle menu entry.

use crate::{AppError, AppResult};

use quick_toggle_core::{RenderCommand, Tone};
use tracing::{info, instrument};
use tray_icon::menu::{Menu, MenuId, MenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

const ICON_SIZE: u32 = 32;

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    toggle_item: MenuItem,
    open_item_id: MenuId,
    exit_item_id: MenuId,
}

impl TrayManager {
    /// Create the tray with a neutral "stopped" look until the first render.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = Menu::new();

        let toggle_item = MenuItem::new("Start", true, None);
        let open_item = MenuItem::new("Open dashboard", true, None);
        let exit_item = MenuItem::new("Exit", true, None);

        let open_id = open_item.id().clone();
        let exit_id = exit_item.id().clone();

        menu.append(&toggle_item)
            .map_err(|e| AppError::tray(format!("Failed to add toggle menu: {}", e)))?;

        menu.append(&open_item)
            .map_err(|e| AppError::tray(format!("Failed to add open menu: {}", e)))?;

        menu.append(&exit_item)
            .map_err(|e| AppError::tray(format!("Failed to add exit menu: {}", e)))?;

        let icon = Self::tone_icon(Tone::Inactive)?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip("Quick Toggle")
            .with_menu(Box::new(menu))
            .with_icon(icon)
            .build()
            .map_err(|e| AppError::tray(format!("Failed to create tray icon: {}", e)))?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            toggle_item,
            open_item_id: open_id,
            exit_item_id: exit_id,
        })
    }

    /// Replace the whole tray presentation with `command`.
    #[track_caller]
    #[instrument(skip(self), fields(instance = command.instance.0, tone = ?command.tone))]
    pub fn apply(&mut self, command: &RenderCommand) -> AppResult<()> {
        let icon = Self::tone_icon(command.tone)?;

        self.tray_icon
            .set_icon(Some(icon))
            .map_err(|e| AppError::tray(format!("Failed to update icon: {}", e)))?;

        self.tray_icon
            .set_tooltip(Some(tooltip_text(command)))
            .map_err(|e| AppError::tray(format!("Failed to update tooltip: {}", e)))?;

        self.toggle_item.set_text(&command.toggle_description);

        Ok(())
    }

    #[track_caller]
    fn tone_icon(tone: Tone) -> AppResult<Icon> {
        Icon::from_rgba(tone_rgba(tone), ICON_SIZE, ICON_SIZE)
            .map_err(|e| AppError::tray(format!("Failed to create icon from RGBA: {}", e)))
    }

    /// Get the toggle menu item ID.
    pub fn toggle_item_id(&self) -> &MenuId {
        self.toggle_item.id()
    }

    /// Get the open-dashboard menu item ID.
    pub fn open_item_id(&self) -> &MenuId {
        &self.open_item_id
    }

    /// Get the exit menu item ID.
    pub fn exit_item_id(&self) -> &MenuId {
        &self.exit_item_id
    }
}

/// Tooltip for a render command: status on the first line, traffic below.
pub(crate) fn tooltip_text(command: &RenderCommand) -> String {
    format!(
        "{}\n{} {}  {} {}",
        command.status_text,
        command.upload_caption,
        command.upload_text,
        command.download_caption,
        command.download_text,
    )
}

/// Tint for each tone.
pub(crate) fn tone_color(tone: Tone) -> [u8; 3] {
    match tone {
        Tone::Active => [0x2e, 0xb8, 0x72],
        Tone::Inactive => [0x8a, 0x8f, 0x98],
        Tone::Error => [0xd9, 0x3f, 0x3f],
    }
}

/// Square RGBA bitmap of a filled disc in the tone's colour on a
/// transparent background.
pub(crate) fn tone_rgba(tone: Tone) -> Vec<u8> {
    let [r, g, b] = tone_color(tone);
    let center = (ICON_SIZE as f32 - 1.0) / 2.0;
    let radius = ICON_SIZE as f32 / 2.0 - 1.0;

    let mut pixels = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);
    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let inside = dx * dx + dy * dy <= radius * radius;
            let alpha = if inside { 0xff } else { 0x00 };
            pixels.extend_from_slice(&[r, g, b, alpha]);
        }
    }

    pixels
}
