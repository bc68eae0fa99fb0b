//! End-to-end registry flows against the in-memory ledger.
use chrono::Utc;
use registry_client::{
    constants::LAMPORTS_PER_SOL,
    domain::encode_client_entry,
    models::{ClientEntry, ClientInfo, NodeInfo, RegistryError},
};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

use super::common::TestContext;

const THIRTY_DAYS: i64 = 30 * 86_400;

#[tokio::test]
async fn test_client_registration_round_trip() {
    let ctx = TestContext::new();
    let (_, registry) = ctx.client.create_registry("alpha").await.unwrap();
    assert!(ctx.ledger.has_account(&registry));
    assert_eq!(registry, ctx.client.registry_address("alpha").unwrap());

    let account = Pubkey::new_unique();
    let entry_address = ctx.client.entry_address("alpha", &account).unwrap();
    let created_at = Utc::now().timestamp();
    ctx.client
        .add_client("alpha", &account, created_at + THIRTY_DAYS, 100)
        .await
        .unwrap();
    assert!(ctx.ledger.has_account(&entry_address));

    let entry = ctx.client.get_client("alpha", &account).await.unwrap().unwrap();
    assert_eq!(entry.parent, registry);
    assert_eq!(entry.registered, account);
    assert_eq!(entry.limit, 100);
    assert!((entry.until - (Utc::now().timestamp() + THIRTY_DAYS)).abs() <= 5);

    let info = ctx.client.check_client("alpha", &account).await.unwrap();
    assert_eq!(
        info,
        ClientInfo {
            until: entry.until,
            limit: 100
        }
    );
}

#[tokio::test]
async fn test_list_clients_on_empty_registry_is_empty() {
    let ctx = TestContext::new();
    ctx.client.create_registry("alpha").await.unwrap();

    assert!(ctx.client.list_clients("alpha").await.unwrap().is_empty());
    assert!(ctx.client.list_nodes("alpha").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_is_scoped_to_registry_and_kind() {
    let ctx = TestContext::new();
    ctx.client.create_registry("alpha").await.unwrap();
    ctx.client.create_registry("beta").await.unwrap();

    let alpha_client = Pubkey::new_unique();
    let beta_client = Pubkey::new_unique();
    let alpha_node = Pubkey::new_unique();
    ctx.client
        .add_client("alpha", &alpha_client, 1_900_000_000, 10)
        .await
        .unwrap();
    ctx.client
        .add_client("beta", &beta_client, 1_900_000_000, 20)
        .await
        .unwrap();
    ctx.client
        .add_node("alpha", &alpha_node, "node.alpha.example")
        .await
        .unwrap();

    let clients = ctx.client.list_clients("alpha").await.unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].registered, alpha_client);

    let nodes = ctx.client.list_nodes("alpha").await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].domain, "node.alpha.example");
}

#[tokio::test]
async fn test_list_skips_foreign_discriminator() {
    let ctx = TestContext::new();
    let (_, registry) = ctx.client.create_registry("alpha").await.unwrap();

    let mut data = encode_client_entry(&ClientEntry {
        parent: registry,
        registered: Pubkey::new_unique(),
        until: 0,
        limit: 1,
    });
    data[..8].copy_from_slice(&[0xAB; 8]);
    ctx.ledger.plant_account(Pubkey::new_unique(), data);

    assert!(ctx.client.list_clients("alpha").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_client_removes_entry() {
    let ctx = TestContext::new();
    ctx.client.create_registry("alpha").await.unwrap();
    let account = Pubkey::new_unique();
    ctx.client
        .add_client("alpha", &account, 1_900_000_000, 5)
        .await
        .unwrap();

    ctx.client.delete_client("alpha", &account).await.unwrap();

    assert_eq!(ctx.client.get_client("alpha", &account).await.unwrap(), None);
    assert!(ctx.client.list_clients("alpha").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_registry_is_rejected_by_program() {
    let ctx = TestContext::new();
    ctx.client.create_registry("alpha").await.unwrap();

    let result = ctx.client.create_registry("alpha").await;

    assert!(matches!(result, Err(RegistryError::TransportFailure(_))));
}

#[tokio::test]
async fn test_node_lifecycle() {
    let ctx = TestContext::new();
    ctx.client.create_registry("alpha").await.unwrap();
    let node_keypair = Keypair::new();
    let node = node_keypair.pubkey();
    ctx.client
        .add_node("alpha", &node, "rpc.example.org")
        .await
        .unwrap();

    let node_client = ctx.client_with(node_keypair);
    node_client
        .update_node_online("alpha", &ctx.wallet, &node, 7)
        .await
        .unwrap();
    node_client
        .update_node_active("alpha", &ctx.wallet, &node, true)
        .await
        .unwrap();

    let entry = ctx.client.get_node("alpha", &node).await.unwrap().unwrap();
    assert_eq!(entry.domain, "rpc.example.org");
    assert_eq!(entry.online, 7);
    assert!(entry.active);

    let info = ctx.client.check_node("alpha", &node).await.unwrap();
    assert_eq!(
        info,
        NodeInfo {
            domain: "rpc.example.org".to_string(),
            active: true
        }
    );

    ctx.client.delete_node("alpha", &node).await.unwrap();
    assert_eq!(ctx.client.get_node("alpha", &node).await.unwrap(), None);
}

#[tokio::test]
async fn test_update_node_active_requires_member_signer() {
    let ctx = TestContext::new();
    ctx.client.create_registry("alpha").await.unwrap();
    let node = Pubkey::new_unique();
    ctx.client
        .add_node("alpha", &node, "rpc.example.org")
        .await
        .unwrap();

    let outsider = ctx.client_with(Keypair::new());
    let result = outsider
        .update_node_active("alpha", &ctx.wallet, &node, true)
        .await;

    assert!(matches!(result, Err(RegistryError::TransportFailure(_))));
    let entry = ctx.client.get_node("alpha", &node).await.unwrap().unwrap();
    assert!(!entry.active);
}

#[tokio::test]
async fn test_negative_online_value_never_reaches_ledger() {
    let ctx = TestContext::new();
    ctx.client.create_registry("alpha").await.unwrap();
    let node_keypair = Keypair::new();
    let node = node_keypair.pubkey();
    ctx.client.add_node("alpha", &node, "a.example").await.unwrap();

    let result = ctx
        .client_with(node_keypair)
        .update_node_online("alpha", &ctx.wallet, &node, -1)
        .await;

    assert!(matches!(result, Err(RegistryError::NegativeOnlineValue(-1))));
    let entry = ctx.client.get_node("alpha", &node).await.unwrap().unwrap();
    assert_eq!(entry.online, 0);
}

#[tokio::test]
async fn test_oversized_domain_is_rejected_before_submit() {
    let ctx = TestContext::new();
    ctx.client.create_registry("alpha").await.unwrap();
    let node = Pubkey::new_unique();

    let result = ctx.client.add_node("alpha", &node, &"d".repeat(254)).await;

    assert!(matches!(
        result,
        Err(RegistryError::DomainTooLong { len: 254, max: 253 })
    ));
    assert!(!ctx
        .ledger
        .has_account(&ctx.client.entry_address("alpha", &node).unwrap()));
}

#[tokio::test]
async fn test_delegate_without_delegation_program_fails() {
    let ctx = TestContext::new();
    ctx.client.create_registry("alpha").await.unwrap();
    let node = Pubkey::new_unique();
    ctx.client.add_node("alpha", &node, "a.example").await.unwrap();

    let result = ctx.client.delegate_node("alpha", &node).await;

    assert!(matches!(result, Err(RegistryError::TransportFailure(_))));
}

#[tokio::test]
async fn test_airdrop_then_transfer() {
    let ctx = TestContext::new();
    let recipient = Pubkey::new_unique();

    let too_much = ctx.client.transfer(&recipient, LAMPORTS_PER_SOL).await;
    assert!(matches!(
        too_much,
        Err(RegistryError::InsufficientBalance {
            balance: 0,
            required: LAMPORTS_PER_SOL
        })
    ));

    ctx.client.airdrop(2 * LAMPORTS_PER_SOL).await.unwrap();
    assert_eq!(ctx.client.balance().await.unwrap(), 2 * LAMPORTS_PER_SOL);

    ctx.client
        .transfer(&recipient, LAMPORTS_PER_SOL / 2)
        .await
        .unwrap();

    assert_eq!(ctx.ledger.balance_of(&recipient), LAMPORTS_PER_SOL / 2);
    assert_eq!(
        ctx.client.balance().await.unwrap(),
        2 * LAMPORTS_PER_SOL - LAMPORTS_PER_SOL / 2
    );
}

#[tokio::test]
async fn test_funded_wallet_can_transfer_everything() {
    let ctx = TestContext::new();
    ctx.ledger.fund(&ctx.wallet, 1_000);
    let recipient = Pubkey::new_unique();

    ctx.client.transfer(&recipient, 1_000).await.unwrap();

    assert_eq!(ctx.ledger.balance_of(&ctx.wallet), 0);
    assert_eq!(ctx.ledger.balance_of(&recipient), 1_000);
}
