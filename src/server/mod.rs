//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Servidor TCP que:
//! 1. Escucha en un puerto (backlog de 100)
//! 2. Acepta conexiones, opcionalmente con un tope de conexiones activas
//! 3. Atiende cada conexión en su propio thread
//! 4. Se detiene esperando a todos los workers

pub mod limit;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use limit::{ConnectionLimit, Permit};
pub use tcp::{handle_connection, Server, ShutdownHandle};
