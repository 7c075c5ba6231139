//! End-to-end tests: real sockets, real WebSocket clients.

use futures::{SinkExt, StreamExt};
use game_session::{
    FixedRecipes, GameSettings, MapDescription, RecipeGame, RegionSpec, Station, StationKind,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use town_server::{ServerConfig, Town, TownRegistry, TownServer};
use town_types::{
    BoundingBox, ClientMessage, CommandEnvelope, GameMovePayload, GamePhase, Ingredient,
    InteractableCommand, PlayerId, PlayerLocation, RegionModel, ServerMessage,
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn kitchen_map() -> MapDescription {
    MapDescription {
        regions: vec![RegionSpec {
            id: "Kitchen".into(),
            bounds: BoundingBox::new(0.0, 0.0, 200.0, 200.0),
            stations: vec![
                Station::new(
                    "SteakStation",
                    BoundingBox::new(10.0, 10.0, 20.0, 20.0),
                    StationKind::Ingredient(Ingredient::Steak),
                ),
                Station::new(
                    "Assembly",
                    BoundingBox::new(100.0, 100.0, 20.0, 20.0),
                    StationKind::Assembly,
                ),
            ],
        }],
    }
}

async fn start_server(max_connections: usize) -> (Arc<TownServer>, String) {
    let rules = RecipeGame::new(
        Arc::new(FixedRecipes::new([vec![
            Ingredient::Steak,
            Ingredient::Rice,
            Ingredient::Salad,
        ]])),
        GameSettings::default(),
    );
    let registry = Arc::new(TownRegistry::new(Duration::from_millis(100)));
    registry
        .open_town(Town::new("town-1", "Test Town", &kitchen_map(), rules))
        .unwrap();

    let config = ServerConfig {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        max_connections,
        ..ServerConfig::default()
    };
    let server = Arc::new(TownServer::new(config, registry));
    let listener = server.bind().unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let serving = server.clone();
    tokio::spawn(async move { serving.serve(listener).await });
    (server, url)
}

async fn send(client: &mut Client, message: &ClientMessage) {
    let text = serde_json::to_string(message).unwrap();
    client.send(Message::text(text)).await.unwrap();
}

async fn command(client: &mut Client, id: &str, target: &str, command: InteractableCommand) {
    let envelope = CommandEnvelope::new(id, target, &command);
    send(client, &ClientMessage::Command(envelope)).await;
}

async fn recv(client: &mut Client) -> ServerMessage {
    loop {
        let frame = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Reads frames until one matches, discarding the rest.
async fn recv_until<T>(client: &mut Client, mut pick: impl FnMut(ServerMessage) -> Option<T>) -> T {
    loop {
        if let Some(found) = pick(recv(client).await) {
            return found;
        }
    }
}

async fn region_update(client: &mut Client, phase: GamePhase) -> RegionModel {
    recv_until(client, |message| match message {
        ServerMessage::InteractableUpdate { interactable }
            if interactable.game.as_ref().map(|g| g.state.status) == Some(phase) =>
        {
            Some(interactable)
        }
        _ => None,
    })
    .await
}

async fn join_town(url: &str, name: &str) -> (Client, PlayerId) {
    let (mut client, _) = connect_async(url).await.unwrap();
    send(
        &mut client,
        &ClientMessage::JoinTown {
            town_id: "town-1".into(),
            user_name: name.into(),
        },
    )
    .await;
    let own_id = recv_until(&mut client, |message| match message {
        ServerMessage::Initialize { own_id, .. } => Some(own_id),
        _ => None,
    })
    .await;
    (client, own_id)
}

#[tokio::test]
async fn two_players_play_a_kitchen_round() {
    let (server, url) = start_server(16).await;
    let (mut ada, ada_id) = join_town(&url, "ada").await;
    let (mut bob, bob_id) = join_town(&url, "bob").await;

    command(&mut ada, "1", "Kitchen", InteractableCommand::JoinGame).await;
    let game_id = recv_until(&mut ada, |message| match message {
        ServerMessage::CommandResponse(response) if response.command_id == "1" => {
            assert!(response.is_ok);
            response.payload
        }
        _ => None,
    })
    .await["gameID"]
        .as_str()
        .unwrap()
        .to_string();

    command(&mut bob, "2", "Kitchen", InteractableCommand::JoinGame).await;
    let waiting = region_update(&mut ada, GamePhase::WaitingToStart).await;
    let state = waiting.game.unwrap().state;
    assert_eq!(state.player_one, Some(ada_id));
    assert_eq!(state.player_two, Some(bob_id));
    let seen_by_bob = region_update(&mut bob, GamePhase::WaitingToStart).await;
    assert_eq!(seen_by_bob.game.unwrap().state.player_one, Some(ada_id));

    let start = || InteractableCommand::StartGame {
        game_id: game_id.clone(),
    };
    command(&mut ada, "3", "Kitchen", start()).await;
    command(&mut bob, "4", "Kitchen", start()).await;
    let running = region_update(&mut bob, GamePhase::InProgress).await;
    let state = running.game.unwrap().state;
    assert_eq!(
        state.current_recipe,
        vec![Ingredient::Steak, Ingredient::Rice, Ingredient::Salad]
    );
    assert!(state.player_one_ready && state.player_two_ready);

    send(
        &mut ada,
        &ClientMessage::GameMovement {
            location: PlayerLocation::at(42.0, 24.0),
        },
    )
    .await;
    let moved = recv_until(&mut bob, |message| match message {
        ServerMessage::PlayerMoved(model) if model.location.x == 42.0 => Some(model),
        _ => None,
    })
    .await;
    assert_ne!(moved.id, ada_id.to_string());
    assert_eq!(moved.user_name, "ada");

    command(
        &mut ada,
        "5",
        "SteakStation",
        InteractableCommand::GameMove {
            game_id: game_id.clone(),
            game_move: GameMovePayload {
                game_piece: "Steak".into(),
            },
        },
    )
    .await;
    let plated = recv_until(&mut bob, |message| match message {
        ServerMessage::InteractableUpdate { interactable } => interactable
            .game
            .filter(|game| !game.state.current_assembled.is_empty())
            .map(|game| game.state),
        _ => None,
    })
    .await;
    assert_eq!(plated.current_assembled, vec![Ingredient::Steak]);

    server.shutdown();
}

#[tokio::test]
async fn bad_requests_get_errors_not_disconnects() {
    let (server, url) = start_server(16).await;
    let (mut ada, _) = join_town(&url, "ada").await;

    command(&mut ada, "x", "Nowhere", InteractableCommand::JoinGame).await;
    let response = recv_until(&mut ada, |message| match message {
        ServerMessage::CommandResponse(response) => Some(response),
        _ => None,
    })
    .await;
    assert_eq!(response.command_id, "x");
    assert!(!response.is_ok);
    assert_eq!(response.error.as_deref(), Some("No such interactable Nowhere"));

    command(&mut ada, "y", "Kitchen", InteractableCommand::StartGame { game_id: String::new() }).await;
    let response = recv_until(&mut ada, |message| match message {
        ServerMessage::CommandResponse(response) => Some(response),
        _ => None,
    })
    .await;
    assert_eq!(response.command_id, "y");
    assert!(!response.is_ok);

    ada.send(Message::text("definitely not json")).await.unwrap();
    let error = recv_until(&mut ada, |message| match message {
        ServerMessage::Error { message } => Some(message),
        _ => None,
    })
    .await;
    assert!(error.starts_with("Invalid message"));

    command(&mut ada, "z", "Kitchen", InteractableCommand::JoinGame).await;
    let response = recv_until(&mut ada, |message| match message {
        ServerMessage::CommandResponse(response) => Some(response),
        _ => None,
    })
    .await;
    assert!(response.is_ok);

    server.shutdown();
}

#[tokio::test]
async fn unknown_town_is_refused_and_disconnects_are_announced() {
    let (server, url) = start_server(16).await;
    let (mut stray, _) = connect_async(url.as_str()).await.unwrap();
    send(
        &mut stray,
        &ClientMessage::JoinTown {
            town_id: "atlantis".into(),
            user_name: "nemo".into(),
        },
    )
    .await;
    let refusal = recv_until(&mut stray, |message| match message {
        ServerMessage::Error { message } => Some(message),
        _ => None,
    })
    .await;
    assert_eq!(refusal, "No such town atlantis");

    let (mut ada, _) = join_town(&url, "ada").await;
    let (bob, bob_id) = join_town(&url, "bob").await;
    drop(bob);
    let gone = recv_until(&mut ada, |message| match message {
        ServerMessage::PlayerDisconnect { id } => Some(id),
        _ => None,
    })
    .await;
    assert_eq!(gone, bob_id);

    server.shutdown();
}

#[tokio::test]
async fn connections_beyond_the_limit_are_dropped() {
    let (server, url) = start_server(1).await;
    let (_ada, _) = join_town(&url, "ada").await;
    assert_eq!(server.connection_manager().connection_count(), 1);

    let refused = connect_async(url.as_str()).await;
    assert!(refused.is_err());

    server.shutdown();
}
