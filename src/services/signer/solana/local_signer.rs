use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};

use crate::models::SignerError;

use super::SolanaSignTrait;

/// Signs with a keypair held in process memory.
pub struct LocalSigner {
    keypair: Keypair,
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("pubkey", &self.keypair.pubkey())
            .finish()
    }
}

impl LocalSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Loads a keypair from its base58 encoding (64 bytes: secret then public half).
    pub fn from_base58(encoded: &str) -> Result<Self, SignerError> {
        let bytes = bs58::decode(encoded.trim())
            .into_vec()
            .map_err(|e| SignerError::KeyError(format!("Invalid base58 key: {e}")))?;

        let keypair = Keypair::try_from(bytes.as_slice())
            .map_err(|e| SignerError::KeyError(format!("Invalid keypair bytes: {e}")))?;

        Ok(Self::new(keypair))
    }
}

#[async_trait]
impl SolanaSignTrait for LocalSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError> {
        Ok(self.keypair.sign_message(message))
    }
}
