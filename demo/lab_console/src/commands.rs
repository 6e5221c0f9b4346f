use std::str::FromStr;

pub const HELP: &str = "\
commands:
  simulate <type>   run a simulation and load its logs
  start <attack>    start an attack with the current iface/target
  stop <attack>     stop an attack
  recon             look for DHCP servers on the current iface
  iface <name>      set the interface
  target <ip>       set the target address (empty to clear)
  show              redraw the dashboard
  help              this text
  quit              exit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Simulate(String),
    Start(String),
    Stop(String),
    Recon,
    Iface(String),
    Target(String),
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Err("empty command".to_string());
        };
        let arg = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return Err(format!("too many arguments for '{}'", verb));
        }

        let need = |arg: Option<String>, what: &str| {
            arg.ok_or_else(|| format!("'{}' needs {}", verb, what))
        };

        match verb.to_ascii_lowercase().as_str() {
            "simulate" | "sim" => need(arg, "a simulation type").map(Command::Simulate),
            "start" => need(arg, "an attack type").map(Command::Start),
            "stop" => need(arg, "an attack type").map(Command::Stop),
            "recon" => Ok(Command::Recon),
            "iface" => need(arg, "an interface name").map(Command::Iface),
            "target" => Ok(Command::Target(arg.unwrap_or_default())),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            "start starvation".parse::<Command>(),
            Ok(Command::Start("starvation".into()))
        );
        assert_eq!(
            "  SIM   arp_spoof ".parse::<Command>(),
            Ok(Command::Simulate("arp_spoof".into()))
        );
        assert_eq!("target".parse::<Command>(), Ok(Command::Target(String::new())));
    }

    #[test]
    fn rejects_missing_and_extra_arguments() {
        assert!("stop".parse::<Command>().is_err());
        assert!("start a b".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
        assert!("launch x".parse::<Command>().is_err());
    }
}
