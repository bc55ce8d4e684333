//! Token contract deployment
//!
//! Deploys compiled contract bytecode (e.g. a Hardhat artifact's `bytecode`
//! field) from a private key and reports the created address.

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::error::NetworkError;

/// A contract created by [`deploy_contract`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployedContract {
    pub address: Address,
    pub tx_hash: TxHash,
    pub deployer: Address,
    /// Native balance of the deployer before deployment
    pub deployer_balance: U256,
}

/// Subset of a Hardhat/Foundry artifact
#[derive(Debug, Deserialize)]
struct Artifact {
    #[serde(rename = "contractName", default)]
    contract_name: Option<String>,
    bytecode: ArtifactBytecode,
}

/// Hardhat stores the bytecode as a string, Foundry as `{ "object": ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArtifactBytecode {
    Hex(String),
    Object { object: String },
}

/// Extract the creation bytecode from an artifact JSON document
pub fn artifact_bytecode(json: &str) -> Result<Bytes, NetworkError> {
    let artifact: Artifact = serde_json::from_str(json)
        .map_err(|e| NetworkError::ContractCall(format!("Invalid artifact: {}", e)))?;

    let hex = match artifact.bytecode {
        ArtifactBytecode::Hex(hex) => hex,
        ArtifactBytecode::Object { object } => object,
    };
    let bytecode: Bytes = hex
        .parse()
        .map_err(|e| NetworkError::ContractCall(format!("Invalid bytecode: {}", e)))?;

    if bytecode.is_empty() {
        return Err(NetworkError::ContractCall(format!(
            "Artifact {} has no bytecode (abstract contract or interface?)",
            artifact.contract_name.as_deref().unwrap_or("<unnamed>")
        )));
    }
    Ok(bytecode)
}

/// Deploy `bytecode` to the chain at `rpc_url`, which must serve `chain_id`
pub async fn deploy_contract(
    rpc_url: &str,
    chain_id: u64,
    private_key: &str,
    bytecode: Bytes,
) -> Result<DeployedContract, NetworkError> {
    let rpc_url: Url = rpc_url
        .parse()
        .map_err(|e| NetworkError::ContractCall(format!("Invalid RPC URL: {}", e)))?;
    let signer: PrivateKeySigner = private_key
        .parse()
        .map_err(|e| NetworkError::ContractCall(format!("Invalid private key: {}", e)))?;
    let deployer = signer.address();

    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(EthereumWallet::from(signer))
        .on_http(rpc_url);

    let actual = provider
        .get_chain_id()
        .await
        .map_err(|e| NetworkError::ContractCall(e.to_string()))?;
    if actual != chain_id {
        return Err(NetworkError::WrongChain {
            expected: chain_id,
            actual,
        });
    }

    let deployer_balance = provider
        .get_balance(deployer)
        .await
        .map_err(|e| NetworkError::ContractCall(e.to_string()))?;

    info!(
        deployer = %deployer,
        chain_id,
        balance = %alloy::primitives::utils::format_ether(deployer_balance),
        bytecode_len = bytecode.len(),
        "Deploying contract"
    );

    let tx = TransactionRequest::default()
        .with_from(deployer)
        .with_deploy_code(bytecode);

    let receipt = provider
        .send_transaction(tx)
        .await
        .map_err(|e| NetworkError::ContractCall(format!("Failed to send deployment: {}", e)))?
        .get_receipt()
        .await
        .map_err(|e| NetworkError::ContractCall(format!("Failed to get deployment receipt: {}", e)))?;

    if !receipt.status() {
        return Err(NetworkError::Reverted(receipt.transaction_hash.to_string()));
    }

    let address = receipt.contract_address.ok_or_else(|| {
        NetworkError::ContractCall("Deployment receipt has no contract address".to_string())
    })?;

    info!(address = %address, tx_hash = %receipt.transaction_hash, "Contract deployed");

    Ok(DeployedContract {
        address,
        tx_hash: receipt.transaction_hash,
        deployer,
        deployer_balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardhat_artifact() {
        let json = r#"{
            "_format": "hh-sol-artifact-1",
            "contractName": "TFT",
            "abi": [],
            "bytecode": "0x6080604052",
            "deployedBytecode": "0x6080"
        }"#;
        let bytecode = artifact_bytecode(json).unwrap();
        assert_eq!(bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn test_foundry_artifact() {
        let json = r#"{ "abi": [], "bytecode": { "object": "0x6080", "linkReferences": {} } }"#;
        assert_eq!(artifact_bytecode(json).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_bytecode_rejected() {
        let json = r#"{ "contractName": "ITFT", "bytecode": "0x" }"#;
        let err = artifact_bytecode(json).unwrap_err();
        assert!(err.to_string().contains("ITFT"));
    }

    #[test]
    fn test_invalid_artifact() {
        assert!(artifact_bytecode("{}").is_err());
        assert!(artifact_bytecode(r#"{ "bytecode": "0xzz" }"#).is_err());
    }
}
