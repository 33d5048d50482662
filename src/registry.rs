//! Component registry
//!
//! A fixed, ordered list of the installable units. Order matters: later
//! components assume earlier ones are in place (timelapse writes into the
//! custom config dir that overrides creates).

use crate::components;
use crate::context::InstallContext;
use crate::error::{PrintkitError, Result};
use crate::orchestrator::StepOutcome;

/// An install or verify routine for one component
pub type ComponentFn = fn(&InstallContext) -> Result<StepOutcome>;

/// One independently installable unit
#[derive(Debug)]
pub struct ComponentSpec {
    /// Unique, stable identifier
    pub name: &'static str,
    /// One-line description shown by `printkit list`
    pub description: &'static str,
    /// Idempotent install routine
    pub install: ComponentFn,
    /// Post-install verification routine
    pub verify: ComponentFn,
}

/// Ordered set of installable components
pub struct Registry {
    components: Vec<ComponentSpec>,
}

impl Registry {
    /// The built-in component set, in installation order
    pub fn builtin() -> Self {
        Self {
            components: vec![
                ComponentSpec {
                    name: "ustreamer",
                    description: "Static ustreamer binary for camera streaming",
                    install: components::ustreamer::install,
                    verify: components::ustreamer::verify,
                },
                ComponentSpec {
                    name: "kamp",
                    description: "KAMP adaptive meshing configs plus printer.cfg include",
                    install: components::kamp::install,
                    verify: components::kamp::verify,
                },
                ComponentSpec {
                    name: "overrides",
                    description: "Custom macros, start_print and overrides configs",
                    install: components::overrides::install,
                    verify: components::overrides::verify,
                },
                ComponentSpec {
                    name: "cleanup",
                    description: "Backup cleanup init.d service registered with Moonraker",
                    install: components::cleanup::install,
                    verify: components::cleanup::verify,
                },
                ComponentSpec {
                    name: "resonance",
                    description: "Patched Klipper resonance_tester.py",
                    install: components::resonance::install,
                    verify: components::resonance::verify,
                },
                ComponentSpec {
                    name: "bed_mesh",
                    description: "bed_mesh.py move_check_distance minval patch",
                    install: components::bed_mesh::install,
                    verify: components::bed_mesh::verify,
                },
                ComponentSpec {
                    name: "timelapse",
                    description: "moonraker-timelapse component with encoder patch",
                    install: components::timelapse::install,
                    verify: components::timelapse::verify,
                },
                ComponentSpec {
                    name: "mainsail",
                    description: "Mainsail web interface served through nginx",
                    install: components::mainsail::install,
                    verify: components::mainsail::verify,
                },
            ],
        }
    }

    /// Build a registry from explicit specs (used by orchestrator tests)
    #[cfg(test)]
    pub fn from_components(components: Vec<ComponentSpec>) -> Self {
        Self { components }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentSpec> {
        self.components.iter()
    }

    /// Select components by name, preserving registry order
    ///
    /// An empty request selects everything. Unknown names are rejected
    /// before any component is attempted.
    pub fn select(&self, requested: &[String]) -> Result<Vec<&ComponentSpec>> {
        for name in requested {
            if !self.components.iter().any(|c| c.name == name) {
                return Err(PrintkitError::UnknownComponent { name: name.clone() });
            }
        }

        let selected: Vec<&ComponentSpec> = self
            .components
            .iter()
            .filter(|c| requested.is_empty() || requested.iter().any(|n| n == c.name))
            .collect();

        if selected.is_empty() {
            return Err(PrintkitError::EmptySelection);
        }
        Ok(selected)
    }
}
