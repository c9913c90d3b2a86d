mod mocks;

mod issuer_tests;
