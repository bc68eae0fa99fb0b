//! Operation and account kinds of the registry program, keyed to their
//! on-chain discriminators.

use strum::{Display, EnumIter};

use crate::constants::*;

/// Every instruction the client can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum InstructionKind {
    InitRegistry,
    AddClient,
    AddNode,
    DelegateNode,
    UndelegateNode,
    CheckClient,
    CheckNode,
    RemoveClient,
    RemoveNode,
    UpdateNodeOnline,
    UpdateNodeActive,
}

impl InstructionKind {
    pub const fn discriminator(self) -> [u8; 8] {
        match self {
            InstructionKind::InitRegistry => INIT_REGISTRY_DISCRIMINATOR,
            InstructionKind::AddClient => ADD_CLIENT_DISCRIMINATOR,
            InstructionKind::AddNode => ADD_NODE_DISCRIMINATOR,
            InstructionKind::DelegateNode => DELEGATE_NODE_DISCRIMINATOR,
            InstructionKind::UndelegateNode => UNDELEGATE_NODE_DISCRIMINATOR,
            InstructionKind::CheckClient => CHECK_CLIENT_DISCRIMINATOR,
            InstructionKind::CheckNode => CHECK_NODE_DISCRIMINATOR,
            InstructionKind::RemoveClient => REMOVE_CLIENT_DISCRIMINATOR,
            InstructionKind::RemoveNode => REMOVE_NODE_DISCRIMINATOR,
            InstructionKind::UpdateNodeOnline => UPDATE_NODE_ONLINE_DISCRIMINATOR,
            InstructionKind::UpdateNodeActive => UPDATE_NODE_ACTIVE_DISCRIMINATOR,
        }
    }

    /// Looks up the instruction a payload starts with.
    pub fn from_data(data: &[u8]) -> Option<Self> {
        use strum::IntoEnumIterator;

        let prefix = data.get(..DISCRIMINATOR_LEN)?;
        Self::iter().find(|kind| kind.discriminator() == prefix)
    }
}

/// Account types owned by the registry program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum AccountKind {
    Registry,
    ClientEntry,
    NodeEntry,
}

impl AccountKind {
    pub const fn discriminator(self) -> [u8; 8] {
        match self {
            AccountKind::Registry => REGISTRY_ACCOUNT_DISCRIMINATOR,
            AccountKind::ClientEntry => CLIENT_ENTRY_ACCOUNT_DISCRIMINATOR,
            AccountKind::NodeEntry => NODE_ENTRY_ACCOUNT_DISCRIMINATOR,
        }
    }
}
