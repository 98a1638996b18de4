use axum::{response::Html, routing::get, Router};

pub fn ui_routes() -> Router {
    Router::new().route("/", get(chat_page))
}

pub async fn chat_page() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

const CHAT_PAGE: &str = r###"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>AI Chat</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 720px; margin: 0 auto; padding: 20px; }
        .message { padding: 0.5rem 0.75rem; margin: 0.5rem 0; border-radius: 6px; white-space: pre-wrap; }
        .user { background: #e7f1ff; text-align: right; }
        .ai { background: #f1f3f5; }
        .error { color: #b02a37; }
        .hidden { display: none; }
    </style>
</head>
<body>
    <h1>AI Chat</h1>

    <form id="register-form">
        <input id="name" placeholder="Name" required>
        <input id="email" type="email" placeholder="Email" required>
        <button type="submit">Start chatting</button>
    </form>

    <div id="chat" class="hidden">
        <div id="messages"></div>
        <p id="status"></p>
        <form id="chat-form">
            <input id="message" placeholder="Type a message..." autocomplete="off">
            <button type="submit" id="send">Send</button>
        </form>
    </div>

    <script>
        const state = { userId: localStorage.getItem('userId'), messages: [], isLoading: false, error: null };

        async function post(path, body) {
            const res = await fetch(path, {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify(body),
            });
            const data = await res.json().catch(() => ({}));
            if (!res.ok) throw new Error(data.error || `Request failed (${res.status})`);
            return data;
        }

        function render() {
            document.getElementById('register-form').classList.toggle('hidden', !!state.userId);
            document.getElementById('chat').classList.toggle('hidden', !state.userId);

            const list = document.getElementById('messages');
            list.innerHTML = '';
            for (const msg of state.messages) {
                const div = document.createElement('div');
                div.className = `message ${msg.role}`;
                div.textContent = msg.content;
                list.appendChild(div);
            }

            const status = document.getElementById('status');
            status.className = state.error ? 'error' : '';
            status.textContent = state.error || (state.isLoading ? 'Thinking...' : '');
            document.getElementById('send').disabled = state.isLoading;
        }

        async function loadChatHistory() {
            if (!state.userId) return;
            try {
                const data = await post('/get-messages', { userId: state.userId });
                state.messages = data.messages
                    .flatMap((msg) => [
                        { role: 'user', content: msg.message },
                        { role: 'ai', content: msg.reply },
                    ])
                    .filter((msg) => msg.content);
                state.error = null;
            } catch (err) {
                state.error = `Could not load chat history: ${err.message}`;
            }
            render();
        }

        document.getElementById('register-form').addEventListener('submit', async (e) => {
            e.preventDefault();
            try {
                const data = await post('/register', {
                    name: document.getElementById('name').value,
                    email: document.getElementById('email').value,
                });
                state.userId = data.userId;
                localStorage.setItem('userId', data.userId);
                state.error = null;
                await loadChatHistory();
            } catch (err) {
                state.error = err.message;
                render();
            }
        });

        document.getElementById('chat-form').addEventListener('submit', async (e) => {
            e.preventDefault();
            const input = document.getElementById('message');
            const message = input.value.trim();
            if (!message || state.isLoading) return;

            input.value = '';
            const pending = { role: 'user', content: message };
            state.messages.push(pending);
            state.isLoading = true;
            state.error = null;
            render();

            try {
                const data = await post('/chat', { message, userId: state.userId });
                state.messages.push({ role: 'ai', content: data.reply });
            } catch (err) {
                // Not persisted, so a history reload would not bring it back.
                state.messages = state.messages.filter((msg) => msg !== pending);
                input.value = message;
                state.error = err.message;
            } finally {
                state.isLoading = false;
                render();
            }
        });

        render();
        loadChatHistory();
    </script>
</body>
</html>
"###;
