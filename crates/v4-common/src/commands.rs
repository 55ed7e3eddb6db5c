use ethers::types::Bytes;

/// Universal Router command identifiers for the subset of commands the
/// runner issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    V4Swap = 0x10,
}

impl CommandType {
    pub fn byte(self) -> u8 {
        self as u8
    }
}

/// Packs router commands into the `(commands, inputs)` pair consumed by
/// `UniversalRouter.execute`.
///
/// Each command contributes exactly one tag byte and one input entry;
/// both are passed to the router verbatim.
#[derive(Debug, Default)]
pub struct RoutePlanner {
    commands: Vec<u8>,
    inputs: Vec<Bytes>,
}

impl RoutePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_command(&mut self, command: CommandType, input: Bytes) {
        self.commands.push(command.byte());
        self.inputs.push(input);
    }

    pub fn commands(&self) -> &[u8] {
        &self.commands
    }

    pub fn inputs(&self) -> &[Bytes] {
        &self.inputs
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn into_parts(self) -> (Bytes, Vec<Bytes>) {
        (Bytes::from(self.commands), self.inputs)
    }
}
