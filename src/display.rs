use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::VideoSubsystem;

use crate::config::DisplayConfig;
use crate::error::Chip8Error;

pub const FB_WIDTH: usize = 64;
pub const FB_HEIGHT: usize = 32;

/// Framebuffer length: one byte per pixel, row-major, index = x + y * 64.
pub const FB_SIZE: usize = FB_WIDTH * FB_HEIGHT;

/// Rendering surface the interpreter pushes framebuffer snapshots to.
/// The core calls `draw` (sprite draws) and `clear` (00E0) only; it never
/// queries display state.
pub trait Screen {
    fn initialize(&mut self) -> Result<(), Chip8Error>;
    fn draw(&mut self, framebuffer: &[u8; FB_SIZE]) -> Result<(), Chip8Error>;
    fn clear(&mut self) -> Result<(), Chip8Error>;
    fn finalize(&mut self) -> Result<(), Chip8Error>;
}

/// SDL2 window rendering the framebuffer as scaled pixel cells.
pub struct SdlScreen {
    canvas: Canvas<Window>,
    config: DisplayConfig,
}

impl SdlScreen {
    pub fn new(video: &VideoSubsystem, config: DisplayConfig) -> Result<SdlScreen, Chip8Error> {
        let window = video
            .window("chip8", config.app_w, config.app_h)
            .position_centered()
            .build()
            .map_err(|e| Chip8Error::Display(e.to_string()))?;

        let canvas = window
            .into_canvas()
            .build()
            .map_err(|e| Chip8Error::Display(e.to_string()))?;

        Ok(SdlScreen { canvas, config })
    }

    fn pixel_color(&self) -> Color {
        Color::RGBA(
            self.config.pixel_r,
            self.config.pixel_g,
            self.config.pixel_b,
            self.config.pixel_a,
        )
    }
}

impl Screen for SdlScreen {
    fn initialize(&mut self) -> Result<(), Chip8Error> {
        self.canvas.set_draw_color(Color::BLACK);
        self.canvas.clear();
        self.canvas.present();
        Ok(())
    }

    fn draw(&mut self, framebuffer: &[u8; FB_SIZE]) -> Result<(), Chip8Error> {
        self.canvas.set_draw_color(Color::BLACK);
        self.canvas.clear();
        self.canvas.set_draw_color(self.pixel_color());

        for y in 0..FB_HEIGHT {
            for x in 0..FB_WIDTH {
                if framebuffer[x + y * FB_WIDTH] == 0 {
                    continue;
                }
                let rect = Rect::new(
                    (x as u32 * self.config.pixel_w) as i32,
                    (y as u32 * self.config.pixel_h) as i32,
                    self.config.pixel_w,
                    self.config.pixel_h,
                );
                self.canvas.fill_rect(rect).map_err(Chip8Error::Display)?;
            }
        }

        self.canvas.present();
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Chip8Error> {
        self.canvas.set_draw_color(Color::BLACK);
        self.canvas.clear();
        self.canvas.present();
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), Chip8Error> {
        Ok(())
    }
}
