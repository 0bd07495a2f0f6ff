use crate::errors::FairnessError;
use crate::games::types::GameKind;
use crate::rng::HashChainRandom;
use schnorrkel::context::SigningContext;
use schnorrkel::{ExpansionMode, Keypair, MiniSecretKey, PublicKey, Signature};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

const VRF_SIGNING_CONTEXT: &[u8] = b"substrate";

/// Everything a player needs to re-derive and check a round's randomness
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FairnessProof {
    /// SHA-256 of the signature, hex; seeds the round RNG
    pub vrf_output: String,
    /// Schnorrkel signature over `input_message`, hex
    pub vrf_proof: String,
    pub public_key: String,
    pub input_message: String,
}

impl FairnessProof {
    pub fn seed(&self) -> Result<[u8; 32], FairnessError> {
        decode_fixed::<32>("vrf_output", &self.vrf_output)
    }

    /// RNG that replays this round's draws
    pub fn rng(&self) -> Result<HashChainRandom, FairnessError> {
        Ok(HashChainRandom::new(self.seed()?))
    }
}

/// Message signed for a round
pub fn input_message(round_id: &Uuid, kind: GameKind, player_id: &str, client_seed: &str) -> String {
    format!("{}:{}:{}:{}", round_id, kind, player_id, client_seed)
}

fn decode_fixed<const N: usize>(field: &'static str, value: &str) -> Result<[u8; N], FairnessError> {
    let bytes = hex::decode(value).map_err(|e| FairnessError::InvalidHex {
        field,
        reason: e.to_string(),
    })?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| FairnessError::InvalidLength {
        field,
        expected: N,
        actual,
    })
}

fn output_of(signature: &[u8; 64]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(signature);
    hasher.finalize().into()
}

/// Signs round inputs so that outcomes can be verified after the fact
pub struct FairnessEngine {
    keypair: Arc<Keypair>,
}

impl FairnessEngine {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    /// Engine with a fresh OS-random keypair
    pub fn new_random() -> Self {
        use rand_core::OsRng;
        Self::new(Keypair::generate_with(OsRng))
    }

    /// Engine with a keypair expanded from a 32-byte secret seed
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, FairnessError> {
        let mini = MiniSecretKey::from_bytes(seed)
            .map_err(|e| FairnessError::InvalidKey(format!("{:?}", e)))?;
        Ok(Self::new(mini.expand_to_keypair(ExpansionMode::Ed25519)))
    }

    pub fn from_seed_hex(seed: &str) -> Result<Self, FairnessError> {
        Self::from_seed(&decode_fixed::<32>("seed", seed)?)
    }

    /// Produces the proof whose output seeds the round.
    pub fn prove_round(
        &self,
        round_id: &Uuid,
        kind: GameKind,
        player_id: &str,
        client_seed: &str,
    ) -> FairnessProof {
        let input_message = input_message(round_id, kind, player_id, client_seed);

        let ctx = SigningContext::new(VRF_SIGNING_CONTEXT);
        let signature = self.keypair.sign(ctx.bytes(input_message.as_bytes())).to_bytes();

        FairnessProof {
            vrf_output: hex::encode(output_of(&signature)),
            vrf_proof: hex::encode(signature),
            public_key: self.public_key_hex(),
            input_message,
        }
    }

    /// Checks a proof against the message the verifier expects.
    ///
    /// Malformed encodings are errors; a well-formed proof that does not match
    /// returns `Ok(false)`.
    pub fn verify_proof(proof: &FairnessProof, expected_input: &str) -> Result<bool, FairnessError> {
        if proof.input_message != expected_input {
            return Ok(false);
        }

        let vrf_output = decode_fixed::<32>("vrf_output", &proof.vrf_output)?;
        let signature_bytes = decode_fixed::<64>("vrf_proof", &proof.vrf_proof)?;
        let public_key_bytes = decode_fixed::<32>("public_key", &proof.public_key)?;

        let public_key = PublicKey::from_bytes(&public_key_bytes)
            .map_err(|e| FairnessError::InvalidKey(format!("{:?}", e)))?;
        let signature = Signature::from_bytes(&signature_bytes)
            .map_err(|e| FairnessError::InvalidSignature(format!("{:?}", e)))?;

        let ctx = SigningContext::new(VRF_SIGNING_CONTEXT);
        if public_key
            .verify(ctx.bytes(expected_input.as_bytes()), &signature)
            .is_err()
        {
            return Ok(false);
        }

        Ok(output_of(&signature_bytes) == vrf_output)
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.keypair.public.to_bytes()
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key())
    }
}
