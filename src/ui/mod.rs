// UI module - window wiring and the event loop
//
// This module contains:
// - EventLoop: blocking read-dispatch loop over the App's event queue
// - EventLoopBridge: marshals background work onto the Slint event loop
// - GuiController: wires the Slint window to the App dispatcher

pub mod bridge;
pub mod controller;
pub mod event_loop;

pub use bridge::{EventLoopBridge, EventLoopBridgeHandle};
pub use controller::GuiController;
pub use event_loop::EventLoop;
