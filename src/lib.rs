// High-level overview:
//
// Protocol:                  ws2811              domain socket          LightDriver               KeySource
// Library Concept:  hardware <-----> lightingd <---------------> tree <-----------> controller <-----------> user
//
// Implementing Binary:                lightingd                       treelight (lib + bin)
//                                     lightingd-dummy

pub mod args;
pub mod config;
pub mod controller;
pub mod daemon;
pub mod driver;
pub mod interpreter;
pub mod keys;
pub mod ledstrip;
pub mod line_input;
pub mod terminal;
pub mod tree;

pub use controller::Controller;
pub use controller::Exit;
pub use driver::Brightness;
pub use driver::LightDriver;
pub use interpreter::Level;
pub use tree::Tree;
