pub mod vote_server;
