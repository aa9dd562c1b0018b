//! Keeps a slim decorative scrollbar (the rail) and the wide results table
//! scrolled to the same horizontal offset.
//!
//! Both sides report their scroll events to the bridge. Writing one side's
//! offset makes that side emit a scroll event of its own; the bridge
//! remembers the write and swallows that echo instead of writing back.

use std::cell::Cell;

use tracing::debug;

/// One horizontally scrollable element.
pub trait ScrollSurface {
    fn scroll_left(&self) -> f64;
    fn set_scroll_left(&self, offset: f64);
    /// Width of the scrollable content, not of the viewport.
    fn set_scroll_width(&self, width: f64);
    /// Drops every scroll and resize listener registered on this element.
    fn remove_listeners(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollSide {
    Rail,
    Table,
}

pub struct SyncedScrollBridge<R: ScrollSurface, T: ScrollSurface> {
    rail: R,
    table: T,
    /// Side and offset of the last mirrored write, until its echo arrives.
    echo: Cell<Option<(ScrollSide, f64)>>,
    content_width: Cell<f64>,
    detached: Cell<bool>,
}

impl<R: ScrollSurface, T: ScrollSurface> SyncedScrollBridge<R, T> {
    pub fn new(rail: R, table: T) -> Self {
        Self {
            rail,
            table,
            echo: Cell::new(None),
            content_width: Cell::new(0.0),
            detached: Cell::new(false),
        }
    }

    pub fn rail(&self) -> &R {
        &self.rail
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn content_width(&self) -> f64 {
        self.content_width.get()
    }

    /// Called when the table's content or viewport resizes.
    pub fn on_content_resize(&self, content_width: f64) {
        if self.detached.get() || content_width == self.content_width.get() {
            return;
        }
        debug!("table content width now {content_width}");
        self.content_width.set(content_width);
        self.rail.set_scroll_width(content_width);
    }

    pub fn on_scroll(&self, side: ScrollSide) {
        if self.detached.get() {
            return;
        }
        let offset = match side {
            ScrollSide::Rail => self.rail.scroll_left(),
            ScrollSide::Table => self.table.scroll_left(),
        };
        if let Some((echo_side, echo_offset)) = self.echo.take()
            && echo_side == side
            && echo_offset == offset
        {
            return;
        }
        match side {
            ScrollSide::Rail if self.table.scroll_left() != offset => {
                self.echo.set(Some((ScrollSide::Table, offset)));
                self.table.set_scroll_left(offset);
            }
            ScrollSide::Table if self.rail.scroll_left() != offset => {
                self.echo.set(Some((ScrollSide::Rail, offset)));
                self.rail.set_scroll_left(offset);
            }
            _ => {}
        }
    }

    /// Removes the listeners on both sides. Later events are ignored.
    pub fn detach(&self) {
        if self.detached.replace(true) {
            return;
        }
        self.echo.set(None);
        self.rail.remove_listeners();
        self.table.remove_listeners();
    }
}

impl<R: ScrollSurface, T: ScrollSurface> Drop for SyncedScrollBridge<R, T> {
    fn drop(&mut self) {
        self.detach();
    }
}
