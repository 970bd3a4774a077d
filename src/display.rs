#[cfg(feature = "colors")]
use owo_colors::OwoColorize;

// Provide a no-op color shim when "colors" feature is disabled
#[cfg(not(feature = "colors"))]
pub mod color_shim {
    use std::fmt::{self, Display, Formatter};

    #[derive(Clone)]
    pub struct Plain(pub String);

    impl Display for Plain {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    pub trait ColorizeShim {
        fn as_str(&self) -> &str;

        fn bold(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn dimmed(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn cyan(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
    }

    impl ColorizeShim for &str {
        fn as_str(&self) -> &str {
            self
        }
    }
    impl ColorizeShim for String {
        fn as_str(&self) -> &str {
            self.as_str()
        }
    }
    impl ColorizeShim for Plain {
        fn as_str(&self) -> &str {
            &self.0
        }
    }
}

#[cfg(not(feature = "colors"))]
use color_shim::ColorizeShim as OwoColorize;

use crate::probe::ProbeOutput;

pub fn build_json_output(plugin_id: &str, output: &ProbeOutput) -> serde_json::Value {
    serde_json::json!({
        "plugin": plugin_id,
        "plan": output.plan,
        "lines": output.lines,
    })
}

pub fn print_json_output(plugin_id: &str, output: &ProbeOutput) -> anyhow::Result<()> {
    let json = build_json_output(plugin_id, output);
    println!("{}", serde_json::to_string(&json)?);
    Ok(())
}

pub fn print_text_output(plugin_id: &str, output: &ProbeOutput) {
    match output.plan.as_deref() {
        Some(plan) => println!("{} {}", plugin_id.cyan().bold(), plan.dimmed()),
        None => println!("{}", plugin_id.cyan().bold()),
    }
    for line in &output.lines {
        println!("  {} {}", format!("{}:", line.label).dimmed(), line.value);
    }
}
