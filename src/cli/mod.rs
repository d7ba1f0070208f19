mod args;

pub use args::{Cli, Mode, Profile, RampArgs, RunArgs, ServeArgs, SoakArgs, SpikeArgs};
